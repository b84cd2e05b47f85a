//! Dropout rates: dropout counts joined against enrollment counts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::record::{Dataset, RawRecord};
use crate::transformations::cleaning::{parse_count, row_dropout_total};

/// Columns both datasets must share for the join.
pub const RATE_JOIN_COLUMNS: [&str; 4] = ["curso", "turno", "semestre", "ano"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    #[error("{dataset} dataset is missing required column: {column}")]
    MissingColumn {
        dataset: &'static str,
        column: String,
    },
}

/// Dropout rate of one (course, shift, period) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropoutRate {
    pub course: String,
    pub shift: String,
    pub year: String,
    pub term: String,
    pub rate: f64,
}

fn require_columns(
    dataset: &Dataset,
    name: &'static str,
    columns: &[&str],
) -> Result<(), RateError> {
    for column in columns {
        if !dataset.has_column(column) {
            return Err(RateError::MissingColumn {
                dataset: name,
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

fn join_key(record: &RawRecord) -> (String, String, String, String) {
    (
        record.get("curso").unwrap_or("").to_string(),
        record.get("turno").unwrap_or("").to_string(),
        record.get("semestre").unwrap_or("").to_string(),
        record.get("ano").unwrap_or("").to_string(),
    )
}

/// Join dropouts against enrollment on (curso, turno, semestre, ano) and
/// compute `rate = total_dropouts / entradas` per matched row.
///
/// Dropout rows without an enrollment match are skipped; a matched row
/// with zero enrollment yields a rate of 0 instead of dividing by zero.
pub fn dropout_rates(
    dropouts: &Dataset,
    enrollment: &Dataset,
) -> Result<Vec<DropoutRate>, RateError> {
    require_columns(dropouts, "dropout", &RATE_JOIN_COLUMNS)?;
    require_columns(enrollment, "enrollment", &RATE_JOIN_COLUMNS)?;
    require_columns(enrollment, "enrollment", &["entradas"])?;

    let mut entries: HashMap<(String, String, String, String), f64> = HashMap::new();
    for record in &enrollment.records {
        entries.insert(join_key(record), parse_count(record.get("entradas")));
    }

    let mut rates = Vec::new();
    for record in &dropouts.records {
        let key = join_key(record);
        let Some(&entradas) = entries.get(&key) else {
            continue;
        };

        let total = row_dropout_total(record);
        let rate = if entradas > 0.0 { total / entradas } else { 0.0 };

        let (course, shift, term, year) = key;
        rates.push(DropoutRate {
            course,
            shift,
            year,
            term,
            rate,
        });
    }

    Ok(rates)
}
