//! Domain models for dropout periods, time series, and forecasts.
//!
//! This module provides the core data structures of the analysis pipeline:
//! academic periods, the per-period dropout series, and the forecast result
//! handed to the presentation layer.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Column names every dropout dataset must carry.
///
/// `curso` identifies the course, `semestre`/`ano` locate the academic
/// period, and the six ordinal columns hold the dropout counts per
/// within-period checkpoint.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "curso", "semestre", "ano", "1° C", "2° C", "3° C", "4° C", "5° C", "6° C",
];

/// The six per-checkpoint dropout count columns, in checkpoint order.
pub const TERM_COLUMNS: [&str; 6] = ["1° C", "2° C", "3° C", "4° C", "5° C", "6° C"];

/// An academic period: a calendar year plus a term (semester) in `{1, 2}`.
///
/// Periods order lexicographically by `(year, term)` and render as the
/// `year.term` label used across charts and the model exchange format.
///
/// # Examples
///
/// ```
/// use evadash::core::domain::PeriodKey;
///
/// let period = PeriodKey::new(2023, 2);
/// assert_eq!(period.label(), "2023.2");
/// assert_eq!(period.next(), PeriodKey::new(2024, 1));
/// assert!(period < PeriodKey::new(2024, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    pub term: u8,
}

impl PeriodKey {
    /// Creates a new period key.
    pub fn new(year: i32, term: u8) -> Self {
        Self { year, term }
    }

    /// Parses a `year.term` label back into a period key.
    ///
    /// Returns `None` when the label does not split into an integer year
    /// and a term in `{1, 2}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use evadash::core::domain::PeriodKey;
    ///
    /// assert_eq!(PeriodKey::from_label("2023.1"), Some(PeriodKey::new(2023, 1)));
    /// assert_eq!(PeriodKey::from_label("2023.3"), None);
    /// assert_eq!(PeriodKey::from_label("n/a"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        let (year, term) = label.split_once('.')?;
        let year: i32 = year.trim().parse().ok()?;
        let term: u8 = term.trim().parse().ok()?;
        if term == 1 || term == 2 {
            Some(Self { year, term })
        } else {
            None
        }
    }

    /// Returns the `year.term` label for this period.
    pub fn label(&self) -> String {
        format!("{}.{}", self.year, self.term)
    }

    /// Returns the period immediately after this one.
    ///
    /// Term 1 advances to term 2 of the same year; term 2 rolls over to
    /// term 1 of the next year.
    pub fn next(&self) -> Self {
        if self.term == 1 {
            Self::new(self.year, 2)
        } else {
            Self::new(self.year + 1, 1)
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.year, self.term)
    }
}

/// One labelled value of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// An ordered sequence of `(label, value)` pairs, one per academic period.
///
/// Produced by the aggregation service with strictly increasing periods
/// and no duplicate labels; consumed by charts and the forecaster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<SeriesPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the most recent historical point, if any.
    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    /// Returns the labels in series order.
    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    /// Returns the values in series order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Which strategy produced a forecast.
///
/// Carried on every [`ForecastResult`] so callers can tell external-model
/// output from the local projection without inspecting metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastSource {
    /// The external analysis process produced the future points.
    ExternalModel,
    /// The local linear projection produced the future points.
    LinearFallback,
}

/// Error metrics reported by the external model for one candidate model.
///
/// Unknown extra fields in the model's report are ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Cross-validated root mean squared error.
    pub cv_rmse: f64,
}

/// Description of the model behind a forecast, for display purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub best_model: String,
    pub metrics: HashMap<String, ModelMetrics>,
}

impl ModelInfo {
    /// Model info for the local linear projection.
    ///
    /// The empty metrics map distinguishes this provenance from external
    /// models, which always report at least one metric entry.
    pub fn linear_projection() -> Self {
        Self {
            best_model: "Simple Linear Projection".to_string(),
            metrics: HashMap::new(),
        }
    }
}

/// A historical series extended with predicted future periods.
///
/// `predicted_start_index` marks the first predicted point inside
/// `series`; everything before it is the unchanged historical data.
///
/// # Examples
///
/// ```
/// use evadash::core::domain::{ForecastResult, ForecastSource, SeriesPoint, TimeSeries};
///
/// let result = ForecastResult {
///     series: TimeSeries::from_points(vec![
///         SeriesPoint::new("2023.1", 10.0),
///         SeriesPoint::new("2023.2", 20.0),
///         SeriesPoint::new("2024.1", 30.0),
///     ]),
///     predicted_start_index: 2,
///     source: ForecastSource::LinearFallback,
///     model_info: None,
/// };
///
/// assert_eq!(result.historical().len(), 2);
/// assert_eq!(result.predicted().len(), 1);
/// assert_eq!(result.predicted()[0].label, "2024.1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub series: TimeSeries,
    pub predicted_start_index: usize,
    pub source: ForecastSource,
    pub model_info: Option<ModelInfo>,
}

impl ForecastResult {
    /// The historical portion of the extended series.
    pub fn historical(&self) -> &[SeriesPoint] {
        &self.series.points[..self.predicted_start_index.min(self.series.len())]
    }

    /// The predicted portion of the extended series.
    pub fn predicted(&self) -> &[SeriesPoint] {
        &self.series.points[self.predicted_start_index.min(self.series.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_ordering_is_year_then_term() {
        let mut periods = vec![
            PeriodKey::new(2024, 1),
            PeriodKey::new(2023, 2),
            PeriodKey::new(2023, 1),
            PeriodKey::new(2024, 2),
        ];
        periods.sort();

        let labels: Vec<String> = periods.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["2023.1", "2023.2", "2024.1", "2024.2"]);
    }

    #[test]
    fn period_label_round_trip() {
        for key in [
            PeriodKey::new(2019, 1),
            PeriodKey::new(2023, 2),
            PeriodKey::new(1999, 1),
        ] {
            assert_eq!(PeriodKey::from_label(&key.label()), Some(key));
        }
    }

    #[test]
    fn from_label_rejects_invalid_terms_and_garbage() {
        assert_eq!(PeriodKey::from_label("2023.0"), None);
        assert_eq!(PeriodKey::from_label("2023.3"), None);
        assert_eq!(PeriodKey::from_label("2023"), None);
        assert_eq!(PeriodKey::from_label("abc.1"), None);
        assert_eq!(PeriodKey::from_label(""), None);
    }

    #[test]
    fn next_flips_terms_and_rolls_years() {
        assert_eq!(PeriodKey::new(2023, 1).next(), PeriodKey::new(2023, 2));
        assert_eq!(PeriodKey::new(2023, 2).next(), PeriodKey::new(2024, 1));
    }

    #[test]
    fn forecast_result_splits_at_prediction_index() {
        let result = ForecastResult {
            series: TimeSeries::from_points(vec![
                SeriesPoint::new("2023.1", 5.0),
                SeriesPoint::new("2023.2", 6.0),
            ]),
            predicted_start_index: 2,
            source: ForecastSource::LinearFallback,
            model_info: None,
        };

        assert_eq!(result.historical().len(), 2);
        assert!(result.predicted().is_empty());
    }
}
