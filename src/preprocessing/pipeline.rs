//! End-to-end analysis pipeline: parse, validate, aggregate, forecast.
//!
//! One pipeline run turns raw CSV text into an [`AnalysisReport`] the
//! presentation layer can render directly. Each run builds fresh data; no
//! state is shared between runs. Data problems never surface as errors:
//! validation failures and aggregation rejections come back inside the
//! report, and only file I/O can fail the call itself.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::domain::{ForecastResult, TimeSeries};
use crate::forecast::Forecaster;
use crate::io::loaders;
use crate::parsing::csv_parser::parse_dropout_csv;
use crate::preprocessing::validator::{DatasetValidator, ValidationResult};
use crate::services::aggregation::aggregate_by_period_checked;
use crate::services::distributions::{
    course_period_breakdown, course_totals, CourseBreakdown, CourseTotal,
};
use crate::transformations::cleaning::CoercionWarning;

/// Configuration for the analysis pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub validate: bool,
    pub course_breakdown: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            validate: true,
            course_breakdown: true,
        }
    }
}

/// Everything one analysis run produced.
///
/// `analysis` is `None` when the dataset failed the validation gate (or
/// was rejected during aggregation); `validation` then carries the
/// user-facing reasons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub checksum: String,
    pub record_count: usize,
    pub validation: ValidationResult,
    pub generated_at: DateTime<Utc>,
    pub analysis: Option<AnalysisData>,
}

/// The chart-ready payload of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisData {
    pub series: TimeSeries,
    pub forecast: ForecastResult,
    pub course_totals: Vec<CourseTotal>,
    pub breakdown: Option<CourseBreakdown>,
    pub coercion_warnings: Vec<CoercionWarning>,
}

/// Main analysis pipeline.
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    forecaster: Forecaster,
}

impl AnalysisPipeline {
    /// Create a pipeline with default configuration.
    pub fn new(forecaster: Forecaster) -> Self {
        Self {
            config: AnalysisConfig::default(),
            forecaster,
        }
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: AnalysisConfig, forecaster: Forecaster) -> Self {
        Self { config, forecaster }
    }

    /// Analyse raw CSV text into a report.
    pub async fn analyze_str(&self, raw_csv: &str) -> AnalysisReport {
        // Step 1: Parse
        let dataset = parse_dropout_csv(raw_csv);
        let generated_at = Utc::now();

        // Step 2: Validate (gate)
        let mut validation = if self.config.validate {
            DatasetValidator::validate(&dataset)
        } else {
            ValidationResult::new()
        };

        if !validation.is_valid {
            return AnalysisReport {
                record_count: dataset.len(),
                checksum: dataset.checksum,
                validation,
                generated_at,
                analysis: None,
            };
        }

        // Step 3: Aggregate into the period series
        let (series, coercion_warnings) = match aggregate_by_period_checked(&dataset.records) {
            Ok(aggregated) => aggregated,
            Err(err) => {
                validation.add_error(err.to_string());
                return AnalysisReport {
                    record_count: dataset.len(),
                    checksum: dataset.checksum,
                    validation,
                    generated_at,
                    analysis: None,
                };
            }
        };

        for warning in coercion_warnings.iter().take(5) {
            validation.add_warning(format!(
                "row {}: non-numeric value '{}' in column '{}' treated as 0",
                warning.row, warning.value, warning.column
            ));
        }
        if coercion_warnings.len() > 5 {
            validation.add_warning(format!(
                "{} non-numeric cells treated as 0 (showing first 5)",
                coercion_warnings.len()
            ));
        }

        // Step 4: Forecast (never fails; degrades to the local projection)
        let forecast = self.forecaster.forecast(&series).await;

        // Step 5: Chart data
        let totals = course_totals(&dataset.records);
        let breakdown = self
            .config
            .course_breakdown
            .then(|| course_period_breakdown(&dataset.records));

        AnalysisReport {
            record_count: dataset.len(),
            checksum: dataset.checksum,
            validation,
            generated_at,
            analysis: Some(AnalysisData {
                series,
                forecast,
                course_totals: totals,
                breakdown,
                coercion_warnings,
            }),
        }
    }

    /// Analyse a `.csv`/`.txt` file into a report.
    pub async fn analyze_file(&self, path: &Path) -> Result<AnalysisReport> {
        let content = loaders::read_dataset_text(path)?;
        Ok(self.analyze_str(&content).await)
    }

    /// Blocking wrapper for callers without an async runtime.
    pub fn analyze_str_blocking(&self, raw_csv: &str) -> Result<AnalysisReport> {
        let runtime =
            tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
        Ok(runtime.block_on(self.analyze_str(raw_csv)))
    }
}
