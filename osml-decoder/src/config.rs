//! Checker configuration types
//!
//! This module defines what the batch checker needs to know: where cleaned
//! captures go, whether existing ones may be replaced, and which files on a
//! storage card are data files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the batch checker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Folder receiving the cleaned `.nmea` files and the report
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Replace output files that already exist
    #[serde(default)]
    pub overwrite: bool,

    /// Write the aggregate report after the batch
    #[serde(default)]
    pub write_report: bool,

    /// File name of the aggregate report inside `output_dir`
    #[serde(default = "default_report_name")]
    pub report_name: String,

    /// Data files on the card start with this prefix (case-insensitive)
    #[serde(default = "default_data_prefix")]
    pub data_prefix: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_report_name() -> String {
    "report.json".to_string()
}

fn default_data_prefix() -> String {
    "data".to_string()
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            overwrite: false,
            write_report: false,
            report_name: default_report_name(),
            data_prefix: default_data_prefix(),
        }
    }
}

impl CheckConfig {
    /// Create a new checker configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the output folder
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Builder method: allow replacing existing output files
    pub fn with_overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = enabled;
        self
    }

    /// Builder method: write the aggregate report
    pub fn with_report(mut self, enabled: bool) -> Self {
        self.write_report = enabled;
        self
    }

    /// Builder method: set the report file name
    pub fn with_report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = name.into();
        self
    }

    /// Builder method: set the data file prefix
    pub fn with_data_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.data_prefix = prefix.into();
        self
    }

    /// Full path of the report file
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_name)
    }

    /// Check if a file on the card is a data file
    pub fn is_data_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| {
                name.to_lowercase()
                    .starts_with(&self.data_prefix.to_lowercase())
            })
            .unwrap_or(false)
    }
}
