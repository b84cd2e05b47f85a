//! Local linear projection used when the analysis process is unavailable.

use crate::core::domain::{ForecastResult, ForecastSource, ModelInfo, PeriodKey, SeriesPoint, TimeSeries};

/// Number of future periods the projection synthesizes.
pub const FUTURE_PERIODS: usize = 6;

/// Extend a historical series by [`FUTURE_PERIODS`] linearly projected
/// points.
///
/// The growth rate is the difference between the last two historical
/// values; each projected value is `last + growth × step`, rounded and
/// clamped to zero. With fewer than two points there is no trend to
/// project, so the series comes back unchanged with the prediction index
/// at its end and no model info.
pub fn linear_projection(series: &TimeSeries) -> ForecastResult {
    let n = series.len();
    if n < 2 {
        log::warn!("not enough history to project a trend ({} points)", n);
        return ForecastResult {
            series: series.clone(),
            predicted_start_index: n,
            source: ForecastSource::LinearFallback,
            model_info: None,
        };
    }

    let last_value = series.points[n - 1].value;
    let growth_rate = last_value - series.points[n - 2].value;

    let mut period = match PeriodKey::from_label(&series.points[n - 1].label) {
        Some(period) => period,
        None => {
            // Labels come from the aggregator and always parse; an
            // arbitrary caller-built series might not. No trend origin
            // means no projection.
            log::warn!(
                "last history label '{}' is not a year.term period",
                series.points[n - 1].label
            );
            return ForecastResult {
                series: series.clone(),
                predicted_start_index: n,
                source: ForecastSource::LinearFallback,
                model_info: None,
            };
        }
    };

    let mut points = series.points.clone();
    for step in 1..=FUTURE_PERIODS {
        period = period.next();
        let predicted = last_value + growth_rate * step as f64;
        points.push(SeriesPoint::new(period.label(), predicted.round().max(0.0)));
    }

    ForecastResult {
        series: TimeSeries::from_points(points),
        predicted_start_index: n,
        source: ForecastSource::LinearFallback,
        model_info: Some(ModelInfo::linear_projection()),
    }
}
