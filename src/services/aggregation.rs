//! Aggregation of row records into the per-period dropout series.
//!
//! Each row contributes its dropout total (the sum of the six term
//! columns) to the bucket of its `(ano, semestre)` period. Every year seen
//! in the data emits both terms, in term order, so the output always holds
//! exactly two points per distinct year. Downstream prediction-index
//! arithmetic relies on that shape.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::domain::{PeriodKey, SeriesPoint, TimeSeries};
use crate::core::record::RawRecord;
use crate::transformations::cleaning::{
    row_dropout_total, row_dropout_total_checked, CoercionWarning,
};

/// Rejections for rows whose period cannot be bucketed.
///
/// Term columns degrade to zero when garbled, but a row without a usable
/// year and term has no bucket to land in; accepting it would silently
/// corrupt the series, so it is rejected instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("row {row}: missing value for column '{column}'")]
    MissingField { row: usize, column: &'static str },

    #[error("row {row}: invalid year '{value}'")]
    InvalidYear { row: usize, value: String },

    #[error("row {row}: invalid term '{value}' (expected 1 or 2)")]
    InvalidTerm { row: usize, value: String },
}

fn parse_period(record: &RawRecord, row: usize) -> Result<PeriodKey, AggregationError> {
    let raw_year = record
        .get("ano")
        .ok_or(AggregationError::MissingField { row, column: "ano" })?;
    let year: i32 = raw_year
        .trim()
        .parse()
        .map_err(|_| AggregationError::InvalidYear {
            row,
            value: raw_year.to_string(),
        })?;

    let raw_term = record.get("semestre").ok_or(AggregationError::MissingField {
        row,
        column: "semestre",
    })?;
    let term: u8 = raw_term
        .trim()
        .parse()
        .ok()
        .filter(|t| *t == 1 || *t == 2)
        .ok_or_else(|| AggregationError::InvalidTerm {
            row,
            value: raw_term.to_string(),
        })?;

    Ok(PeriodKey::new(year, term))
}

fn emit_series(buckets: BTreeMap<i32, [f64; 2]>) -> TimeSeries {
    let mut points = Vec::with_capacity(buckets.len() * 2);
    for (year, totals) in buckets {
        points.push(SeriesPoint::new(PeriodKey::new(year, 1).label(), totals[0]));
        points.push(SeriesPoint::new(PeriodKey::new(year, 2).label(), totals[1]));
    }
    TimeSeries::from_points(points)
}

/// Aggregate records into the period-indexed dropout series.
///
/// Years are emitted in ascending order, term 1 then term 2; a year with
/// rows for only one term still emits the other term with a zero value.
/// Non-numeric term counts coerce to zero; rows whose `ano` or `semestre`
/// cannot be parsed (or name a term outside `{1, 2}`) are rejected.
pub fn aggregate_by_period(records: &[RawRecord]) -> Result<TimeSeries, AggregationError> {
    let mut buckets: BTreeMap<i32, [f64; 2]> = BTreeMap::new();

    for (row, record) in records.iter().enumerate() {
        let period = parse_period(record, row)?;
        let bucket = buckets.entry(period.year).or_insert([0.0; 2]);
        bucket[(period.term - 1) as usize] += row_dropout_total(record);
    }

    Ok(emit_series(buckets))
}

/// Like [`aggregate_by_period`], also collecting a warning for every term
/// cell that was coerced to zero.
pub fn aggregate_by_period_checked(
    records: &[RawRecord],
) -> Result<(TimeSeries, Vec<CoercionWarning>), AggregationError> {
    let mut buckets: BTreeMap<i32, [f64; 2]> = BTreeMap::new();
    let mut warnings = Vec::new();

    for (row, record) in records.iter().enumerate() {
        let period = parse_period(record, row)?;
        let total = row_dropout_total_checked(record, row, &mut warnings);
        let bucket = buckets.entry(period.year).or_insert([0.0; 2]);
        bucket[(period.term - 1) as usize] += total;
    }

    Ok((emit_series(buckets), warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::csv_parser::parse_dropout_csv;

    const HEADER: &str = "curso,semestre,ano,1° C,2° C,3° C,4° C,5° C,6° C";

    fn aggregate(content: &str) -> Result<TimeSeries, AggregationError> {
        aggregate_by_period(&parse_dropout_csv(content).records)
    }

    #[test]
    fn sums_rows_into_period_buckets() {
        let content = format!(
            "{HEADER}\n\
             Medicina,1,2023,1,1,0,0,0,0\n\
             Direito,1,2023,2,0,0,0,0,0\n\
             Medicina,2,2023,0,0,3,0,0,0\n"
        );
        let series = aggregate(&content).unwrap();

        assert_eq!(series.labels(), vec!["2023.1", "2023.2"]);
        assert_eq!(series.values(), vec![4.0, 3.0]);
    }

    #[test]
    fn emits_both_terms_even_with_single_term_data() {
        let content = format!("{HEADER}\nMedicina,1,2023,2,0,0,0,0,0\n");
        let series = aggregate(&content).unwrap();

        assert_eq!(series.labels(), vec!["2023.1", "2023.2"]);
        assert_eq!(series.values(), vec![2.0, 0.0]);
    }

    #[test]
    fn orders_years_ascending_regardless_of_input_order() {
        let content = format!(
            "{HEADER}\n\
             Medicina,2,2024,5,0,0,0,0,0\n\
             Medicina,1,2022,1,0,0,0,0,0\n\
             Medicina,1,2023,3,0,0,0,0,0\n"
        );
        let series = aggregate(&content).unwrap();

        assert_eq!(
            series.labels(),
            vec!["2022.1", "2022.2", "2023.1", "2023.2", "2024.1", "2024.2"]
        );
        assert_eq!(series.values(), vec![1.0, 0.0, 3.0, 0.0, 0.0, 5.0]);
    }

    #[test]
    fn aggregation_is_invariant_under_row_order() {
        let rows = [
            "Medicina,1,2023,1,0,0,0,0,0",
            "Direito,2,2023,0,2,0,0,0,0",
            "Medicina,2,2024,0,0,3,0,0,0",
            "Direito,1,2024,4,0,0,0,0,0",
        ];

        let forward = format!("{HEADER}\n{}\n", rows.join("\n"));
        let reversed = format!(
            "{HEADER}\n{}\n",
            rows.iter().rev().cloned().collect::<Vec<_>>().join("\n")
        );

        assert_eq!(aggregate(&forward).unwrap(), aggregate(&reversed).unwrap());
    }

    #[test]
    fn coerces_garbled_counts_to_zero() {
        let content = format!("{HEADER}\nMedicina,1,2023,2,n/a,,1,x,0\n");
        let series = aggregate(&content).unwrap();

        assert_eq!(series.values(), vec![3.0, 0.0]);
    }

    #[test]
    fn checked_variant_reports_coercions() {
        let content = format!("{HEADER}\nMedicina,1,2023,2,n/a,0,1,x,0\n");
        let dataset = parse_dropout_csv(&content);

        let (series, warnings) = aggregate_by_period_checked(&dataset.records).unwrap();

        assert_eq!(series.values(), vec![3.0, 0.0]);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].value, "n/a");
    }

    #[test]
    fn rejects_third_term() {
        let content = format!("{HEADER}\nMedicina,3,2023,1,0,0,0,0,0\n");
        assert_eq!(
            aggregate(&content),
            Err(AggregationError::InvalidTerm {
                row: 0,
                value: "3".to_string()
            })
        );
    }

    #[test]
    fn rejects_unparsable_year() {
        let content = format!("{HEADER}\nMedicina,1,two-thousand,1,0,0,0,0,0\n");
        assert_eq!(
            aggregate(&content),
            Err(AggregationError::InvalidYear {
                row: 0,
                value: "two-thousand".to_string()
            })
        );
    }

    #[test]
    fn rejects_row_missing_period_fields() {
        let content = format!("{HEADER}\nMedicina,1\n");
        assert_eq!(
            aggregate(&content),
            Err(AggregationError::MissingField { row: 0, column: "ano" })
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_row() -> impl Strategy<Value = String> {
            (
                prop_oneof![Just("Medicina"), Just("Direito"), Just("Letras")],
                1u8..=2,
                2018i32..=2026,
                proptest::collection::vec(0u32..20, 6),
            )
                .prop_map(|(course, term, year, counts)| {
                    let counts: Vec<String> = counts.iter().map(u32::to_string).collect();
                    format!("{course},{term},{year},{}", counts.join(","))
                })
        }

        proptest! {
            /// Shuffling input rows never changes the aggregated series.
            #[test]
            fn shuffle_invariance(rows in proptest::collection::vec(arb_row(), 1..40)) {
                let forward = format!("{HEADER}\n{}\n", rows.join("\n"));
                let mut shuffled_rows = rows.clone();
                shuffled_rows.reverse();
                let mid = shuffled_rows.len() / 2;
                shuffled_rows.rotate_left(mid);
                let shuffled = format!("{HEADER}\n{}\n", shuffled_rows.join("\n"));

                let a = aggregate(&forward).unwrap();
                let b = aggregate(&shuffled).unwrap();
                prop_assert_eq!(a, b);
            }

            /// Exactly two points per distinct year, term 1 before term 2.
            #[test]
            fn two_terms_per_year(rows in proptest::collection::vec(arb_row(), 1..40)) {
                let content = format!("{HEADER}\n{}\n", rows.join("\n"));
                let series = aggregate(&content).unwrap();

                prop_assert_eq!(series.len() % 2, 0);
                for pair in series.points.chunks(2) {
                    let first = PeriodKey::from_label(&pair[0].label).unwrap();
                    let second = PeriodKey::from_label(&pair[1].label).unwrap();
                    prop_assert_eq!(first.year, second.year);
                    prop_assert_eq!(first.term, 1);
                    prop_assert_eq!(second.term, 2);
                }
            }
        }
    }
}
