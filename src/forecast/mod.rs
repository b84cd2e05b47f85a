//! Forecasting: external statistical model first, linear projection always.
//!
//! The forecaster serializes the historical series into the exchange CSV,
//! hands it to the configured [`ModelRunner`], and validates the response.
//! Every failure along that path (spawn error, timeout, non-zero exit,
//! schema mismatch) is logged and masked by the local projection, so a
//! forecast is always produced.

pub mod collaborator;
pub mod fallback;

pub use collaborator::{CollaboratorError, ModelResponse, ModelRunner, ProcessModelRunner};

use crate::config::ForecastSettings;
use crate::core::domain::{
    ForecastResult, ForecastSource, ModelInfo, PeriodKey, SeriesPoint, TimeSeries,
};

/// Header of the CSV handed to the analysis process.
pub const MODEL_CSV_HEADER: &str = "ano,semestre,desistentes";

/// Produces forecasts from historical dropout series.
pub struct Forecaster {
    runner: Box<dyn ModelRunner>,
}

impl Forecaster {
    pub fn new(runner: Box<dyn ModelRunner>) -> Self {
        Self { runner }
    }

    /// Forecaster backed by the configured analysis process.
    pub fn from_settings(settings: &ForecastSettings) -> Self {
        Self::new(Box::new(ProcessModelRunner::from_settings(settings)))
    }

    /// Extend the historical series with predicted future periods.
    ///
    /// Tries the external model first and falls back to
    /// [`fallback::linear_projection`] on any collaborator failure. The
    /// result's [`ForecastSource`] records which path produced it.
    pub async fn forecast(&self, series: &TimeSeries) -> ForecastResult {
        match self.run_external(series).await {
            Ok(result) => result,
            Err(err) => {
                log::warn!("external analysis unavailable ({}); using linear projection", err);
                fallback::linear_projection(series)
            }
        }
    }

    async fn run_external(&self, series: &TimeSeries) -> Result<ForecastResult, CollaboratorError> {
        let request = series_to_model_csv(series)?;
        let response = self.runner.run(&request).await?;
        extend_series(series, response)
    }
}

/// Serialize a series into the `ano,semestre,desistentes` exchange format.
///
/// Each label splits back into its year and term; a label that does not
/// parse is an error (the aggregator never produces one).
pub fn series_to_model_csv(series: &TimeSeries) -> Result<String, CollaboratorError> {
    let mut lines = Vec::with_capacity(series.len() + 1);
    lines.push(MODEL_CSV_HEADER.to_string());

    for point in &series.points {
        let key = PeriodKey::from_label(&point.label)
            .ok_or_else(|| CollaboratorError::InvalidHistory(point.label.clone()))?;
        lines.push(format!("{},{},{}", key.year, key.term, point.value));
    }

    Ok(lines.join("\n"))
}

/// Validate a collaborator response and append it to the history.
fn extend_series(
    series: &TimeSeries,
    response: ModelResponse,
) -> Result<ForecastResult, CollaboratorError> {
    if response.future_labels.len() != response.future_predictions.len() {
        return Err(CollaboratorError::MalformedResponse(format!(
            "future_labels ({}) and future_predictions ({}) lengths differ",
            response.future_labels.len(),
            response.future_predictions.len()
        )));
    }

    for label in &response.future_labels {
        if PeriodKey::from_label(label).is_none() {
            return Err(CollaboratorError::MalformedResponse(format!(
                "future label '{}' is not a year.term period",
                label
            )));
        }
    }

    let mut points = series.points.clone();
    points.extend(
        response
            .future_labels
            .into_iter()
            .zip(response.future_predictions)
            .map(|(label, value)| SeriesPoint::new(label, value)),
    );

    Ok(ForecastResult {
        series: TimeSeries::from_points(points),
        predicted_start_index: series.len(),
        source: ForecastSource::ExternalModel,
        model_info: Some(ModelInfo {
            best_model: response.best_model,
            metrics: response.model_metrics,
        }),
    })
}
