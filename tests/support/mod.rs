//! Shared fixtures for integration tests.

use std::collections::HashMap;

use async_trait::async_trait;

use evadash::core::domain::ModelMetrics;
use evadash::forecast::{CollaboratorError, ModelResponse, ModelRunner};

/// Header shared by every synthetic dropout CSV.
pub const DROPOUT_HEADER: &str = "curso,semestre,ano,1° C,2° C,3° C,4° C,5° C,6° C";

/// Build a dropout CSV from (course, term, year, first-checkpoint count)
/// rows; the remaining checkpoints are zero.
pub fn dropout_csv(rows: &[(&str, u8, i32, u32)]) -> String {
    let mut lines = vec![DROPOUT_HEADER.to_string()];
    for (course, term, year, count) in rows {
        lines.push(format!("{course},{term},{year},{count},0,0,0,0,0"));
    }
    lines.join("\n")
}

/// A collaborator that replies with a fixed response and records nothing.
pub struct CannedRunner {
    pub response: ModelResponse,
}

impl CannedRunner {
    pub fn with_two_periods() -> Self {
        Self {
            response: ModelResponse {
                future_labels: vec!["2024.1".to_string(), "2024.2".to_string()],
                future_predictions: vec![30.0, 40.0],
                best_model: "RandomForest".to_string(),
                model_metrics: HashMap::from([(
                    "RandomForest".to_string(),
                    ModelMetrics { cv_rmse: 2.5 },
                )]),
            },
        }
    }
}

#[async_trait]
impl ModelRunner for CannedRunner {
    async fn run(&self, _request_csv: &str) -> Result<ModelResponse, CollaboratorError> {
        Ok(self.response.clone())
    }
}

/// A collaborator that always fails the exchange.
pub struct FailingRunner;

#[async_trait]
impl ModelRunner for FailingRunner {
    async fn run(&self, _request_csv: &str) -> Result<ModelResponse, CollaboratorError> {
        Err(CollaboratorError::NonZeroExit {
            exit_code: 1,
            stderr: "analysis crashed".to_string(),
        })
    }
}
