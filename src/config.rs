//! Application configuration from TOML files.
//!
//! Covers the one deployment-specific concern of the core: how to start
//! the external analysis process and how long to wait for it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub forecast: ForecastSettings,
}

/// How to reach the external analysis process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSettings {
    /// Executable to spawn.
    #[serde(default = "default_command")]
    pub command: String,
    /// Arguments passed to the executable.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Wall-clock budget before the process is killed and the local
    /// projection takes over.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_command() -> String {
    "python3".to_string()
}

fn default_args() -> Vec<String> {
    vec!["ml/analisar.py".to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
