use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::record::Dataset;
use crate::parsing::csv_parser;

/// Read the raw text of a dropout export, rejecting unsupported formats.
///
/// Exports arrive as `.csv` or `.txt`; anything else is refused before the
/// file is read.
pub fn read_dataset_text(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .context("File has no extension")?;

    match extension.to_lowercase().as_str() {
        "csv" | "txt" => fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Unified interface for loading dropout datasets.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load a dataset from a `.csv` or `.txt` file.
    pub fn load_from_file(path: &Path) -> Result<Dataset> {
        let content = read_dataset_text(path)?;
        Ok(csv_parser::parse_dropout_csv(&content))
    }

    /// Parse a dataset from in-memory text.
    pub fn load_from_str(content: &str) -> Dataset {
        csv_parser::parse_dropout_csv(content)
    }
}
