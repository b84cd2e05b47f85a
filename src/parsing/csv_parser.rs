//! Parser for the dropout CSV export format.
//!
//! The format is deliberately simple: a comma-separated header line followed
//! by comma-separated data lines, no quoting or escaping. Splitting on every
//! comma is the contract, not a shortcut; values containing commas do not
//! occur in the export and are not supported.

use std::sync::Arc;

use crate::core::record::{content_checksum, Dataset, RawRecord};

/// Parse raw dropout CSV text into a [`Dataset`].
///
/// Empty and whitespace-only lines are dropped first, so a leading blank
/// line cannot be mistaken for the header. The first remaining line is the
/// header; every later line is split on commas, trimmed, and zipped
/// positionally against the header. A line with fewer fields than headers
/// yields records whose trailing columns have no value; the line is kept,
/// not rejected.
///
/// Text with no non-blank lines parses to an empty dataset, which the
/// validator rejects downstream.
pub fn parse_dropout_csv(content: &str) -> Dataset {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let headers: Arc<Vec<String>> = match lines.next() {
        Some(header_line) => Arc::new(
            header_line
                .split(',')
                .map(|h| h.trim().to_string())
                .collect(),
        ),
        None => Arc::new(Vec::new()),
    };

    let records = lines
        .map(|line| {
            let values = line.split(',').map(|v| v.trim().to_string()).collect();
            RawRecord::new(Arc::clone(&headers), values)
        })
        .collect();

    Dataset {
        headers,
        records,
        checksum: content_checksum(content),
    }
}
