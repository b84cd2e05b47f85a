//! Boundary to the external statistical analysis process.
//!
//! The collaborator is modelled as a request/response interface: hand it
//! the historical series as CSV text, get back a typed [`ModelResponse`].
//! [`ProcessModelRunner`] is the production implementation, spawning the
//! configured command, piping the request to its stdin, and decoding its
//! stdout on a clean exit. The timeout kills the child process; the caller
//! treats every error here as a signal to fall back locally.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::config::ForecastSettings;
use crate::core::domain::ModelMetrics;

/// Maximum bytes captured per output stream. Output past this limit is
/// truncated to keep a runaway child from exhausting memory.
const MAX_OUTPUT_BYTES: usize = 4 * 1024 * 1024;

/// Successful response of the analysis process.
///
/// `future_labels` and `future_predictions` are parallel sequences;
/// `model_metrics` maps each candidate model to its error metrics. Extra
/// fields in the payload are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub future_labels: Vec<String>,
    pub future_predictions: Vec<f64>,
    pub best_model: String,
    pub model_metrics: HashMap<String, ModelMetrics>,
}

/// Failures of the external analysis exchange.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// The process could not be spawned or its pipes failed.
    #[error("analysis process I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The process outlived its timeout and was killed.
    #[error("analysis process timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// The process exited with a non-zero status.
    #[error("analysis process exited with code {exit_code}: {stderr}")]
    NonZeroExit { exit_code: i32, stderr: String },

    /// The process exited cleanly but its stdout did not match the
    /// response schema.
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),

    /// A historical label could not be serialized into the request.
    #[error("history label '{0}' is not a year.term period")]
    InvalidHistory(String),
}

/// Request/response interface to the analysis collaborator.
///
/// Implementations own the transport; the forecaster only sees the typed
/// response or a [`CollaboratorError`].
#[async_trait]
pub trait ModelRunner: Send + Sync {
    /// Submit the historical series (CSV text) and await the response.
    async fn run(&self, request_csv: &str) -> Result<ModelResponse, CollaboratorError>;
}

/// Runs the analysis as a child process speaking CSV-in/JSON-out over
/// stdio.
#[derive(Debug, Clone)]
pub struct ProcessModelRunner {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessModelRunner {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    pub fn from_settings(settings: &ForecastSettings) -> Self {
        Self::new(
            settings.command.clone(),
            settings.args.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }
}

#[async_trait]
impl ModelRunner for ProcessModelRunner {
    async fn run(&self, request_csv: &str) -> Result<ModelResponse, CollaboratorError> {
        let mut cmd = Command::new(&self.command);
        // `kill_on_drop(true)` ensures the child dies when dropped on the
        // timeout path.
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn()?;

        // Write the request, then close stdin so the child sees EOF. If it
        // closes its end early the write error is irrelevant.
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(request_csv.as_bytes()).await;
            drop(stdin);
        }

        // Read both streams in tasks so `child.wait()` can borrow the child.
        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let stdout_task = tokio::spawn(async move { read_stream(stdout_handle).await });
        let stderr_task = tokio::spawn(async move { read_stream(stderr_handle).await });

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => {
                let stdout = String::from_utf8_lossy(&stdout_task.await.unwrap_or_default())
                    .into_owned();
                let stderr = String::from_utf8_lossy(&stderr_task.await.unwrap_or_default())
                    .into_owned();

                if !status.success() {
                    return Err(CollaboratorError::NonZeroExit {
                        exit_code: status.code().unwrap_or(-1),
                        stderr: stderr.trim().to_string(),
                    });
                }

                decode_response(stdout.trim())
            }
            Ok(Err(err)) => Err(CollaboratorError::Io(err)),
            Err(_elapsed) => Err(CollaboratorError::Timeout {
                elapsed_ms: start.elapsed().as_millis() as u64,
            }),
        }
    }
}

/// Decode the collaborator's stdout into a [`ModelResponse`].
///
/// Decoding goes through `serde_path_to_error` so a schema mismatch names
/// the offending field in the logs.
pub fn decode_response(stdout: &str) -> Result<ModelResponse, CollaboratorError> {
    let mut deserializer = serde_json::Deserializer::from_str(stdout);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|err| CollaboratorError::MalformedResponse(err.to_string()))
}

async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    buf
}
