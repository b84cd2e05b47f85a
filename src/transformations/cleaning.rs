//! Numeric coercion for raw CSV cells.
//!
//! Dropout counts arrive as strings and are frequently blank or garbled in
//! real exports. The default policy treats anything that does not parse as
//! zero; the checked variants record what was coerced so callers can show
//! data-quality hints.

use serde::{Deserialize, Serialize};

use crate::core::domain::TERM_COLUMNS;
use crate::core::record::RawRecord;

/// A non-numeric cell that was coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercionWarning {
    /// Zero-based data-row index (the header does not count).
    pub row: usize,
    pub column: String,
    pub value: String,
}

/// Parse a cell as f64, treating a missing or non-numeric value as 0.
pub fn parse_count(value: Option<&str>) -> f64 {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Sum the six term columns of a record into its dropout total.
pub fn row_dropout_total(record: &RawRecord) -> f64 {
    TERM_COLUMNS
        .iter()
        .map(|column| parse_count(record.get(column)))
        .sum()
}

/// Like [`row_dropout_total`], recording a warning for every cell that was
/// present but did not parse as a number. Missing cells stay silent: a
/// short row is an accepted input shape, not a data-quality problem.
pub fn row_dropout_total_checked(
    record: &RawRecord,
    row: usize,
    warnings: &mut Vec<CoercionWarning>,
) -> f64 {
    let mut total = 0.0;
    for column in TERM_COLUMNS {
        match record.get(column) {
            Some(raw) if !raw.trim().is_empty() => match raw.trim().parse::<f64>() {
                Ok(value) => total += value,
                Err(_) => warnings.push(CoercionWarning {
                    row,
                    column: column.to_string(),
                    value: raw.to_string(),
                }),
            },
            _ => {}
        }
    }
    total
}
