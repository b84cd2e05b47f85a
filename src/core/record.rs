//! Raw CSV records and the parsed dataset container.
//!
//! A [`RawRecord`] keeps the original string cells of one CSV line, zipped
//! positionally against the header row. All records of a file share one
//! header list, so a column "exists" for a record whenever the header names
//! it, even when a short line carries no value at that position.

use std::sync::Arc;

use sha2::{Digest, Sha256};

/// One data line of a dropout CSV, keyed by the shared header row.
#[derive(Debug, Clone)]
pub struct RawRecord {
    headers: Arc<Vec<String>>,
    values: Vec<String>,
}

impl RawRecord {
    pub fn new(headers: Arc<Vec<String>>, values: Vec<String>) -> Self {
        Self { headers, values }
    }

    /// Returns the value under `column`, or `None` when the header does not
    /// name the column or the line was too short to reach it.
    pub fn get(&self, column: &str) -> Option<&str> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.values.get(index).map(String::as_str)
    }

    /// Returns `true` when the header row names `column`.
    ///
    /// A short line still has the column; only [`RawRecord::get`] reports
    /// the missing value.
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// The shared header row, in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The raw cell values of this line, in file order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// A parsed dropout CSV: shared headers, one record per data line, and the
/// SHA-256 fingerprint of the raw text it came from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub headers: Arc<Vec<String>>,
    pub records: Vec<RawRecord>,
    pub checksum: String,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

/// Calculate the SHA-256 checksum of raw dataset content.
///
/// Used to fingerprint uploads so repeated analyses of the same file can be
/// recognised in the UI.
pub fn content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
