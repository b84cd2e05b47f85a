//! Dataset validation against the required dropout columns.
//!
//! Validation is the gate between parsing and aggregation: a dataset that
//! fails here must not be analysed, and the caller owns the user-facing
//! messaging. The check never panics and never returns an error type;
//! the outcome is carried in [`ValidationResult`].

use serde::{Deserialize, Serialize};

use crate::core::domain::REQUIRED_COLUMNS;
use crate::core::record::Dataset;

/// Outcome of validating a parsed dataset.
///
/// Errors make `is_valid` false; warnings are informational and do not
/// fail validation.
///
/// # Examples
///
/// ```
/// use evadash::preprocessing::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_error("Missing required column: curso".to_string());
/// assert!(!result.is_valid);
/// assert_eq!(result.errors.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

/// Summary statistics computed during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_records: usize,
    pub missing_columns: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Adds a critical error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Adds a non-critical warning without invalidating the result.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for dropout datasets.
///
/// The column check inspects the first record as a representative sample
/// of the file: the header row names the same columns for every record,
/// so per-row re-checking would only repeat the same answer. A row deeper
/// in the file with missing or garbled values still passes validation;
/// the aggregation step deals with those.
///
/// # Examples
///
/// ```
/// use evadash::parsing::csv_parser::parse_dropout_csv;
/// use evadash::preprocessing::validator::DatasetValidator;
///
/// let dataset = parse_dropout_csv("curso,ano\nMedicina,2023\n");
/// let result = DatasetValidator::validate(&dataset);
///
/// assert!(!result.is_valid);
/// assert!(result.stats.missing_columns.contains(&"semestre".to_string()));
/// ```
pub struct DatasetValidator;

impl DatasetValidator {
    /// Validates a parsed dataset against the required column set.
    ///
    /// Fails on an empty dataset and on any required column absent from
    /// the first record. Returns the outcome; never panics or errors.
    pub fn validate(dataset: &Dataset) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.stats.total_records = dataset.len();

        let sample = match dataset.records.first() {
            Some(record) => record,
            None => {
                result.add_error("Dataset is empty".to_string());
                return result;
            }
        };

        for column in REQUIRED_COLUMNS {
            if !sample.has_column(column) {
                result.stats.missing_columns.push(column.to_string());
                result.add_error(format!("Missing required column: {}", column));
            }
        }

        result
    }
}
