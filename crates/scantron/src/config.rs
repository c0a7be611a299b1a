//! JSON run configuration for the `scantron mark` command.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use scantron_mark::{ExportFormat, MarkStyle, DEFAULT_FILE_NAME, DEFAULT_QUALITY};

use crate::error::ConfigError;

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

/// Inputs and outputs of one marking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Coordinate dataset (`.csv` / `.json`).
    pub coords_path: String,
    /// Blank reference form image.
    pub image_path: String,
    /// Answer-key dataset (`.csv` / `.json`).
    pub answers_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Defaults to the output extension, then JPEG.
    #[serde(default)]
    pub format: Option<ExportFormat>,
    #[serde(default = "default_quality")]
    pub quality: u8,
    #[serde(default)]
    pub style: MarkStyle,
    #[serde(default)]
    pub report_path: Option<String>,
}

impl RunConfig {
    pub fn new(
        coords_path: impl Into<String>,
        image_path: impl Into<String>,
        answers_path: impl Into<String>,
    ) -> Self {
        Self {
            coords_path: coords_path.into(),
            image_path: image_path.into(),
            answers_path: answers_path.into(),
            output_path: None,
            format: None,
            quality: DEFAULT_QUALITY,
            style: MarkStyle::default(),
            report_path: None,
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the annotated image path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME))
    }

    /// Explicit format, else the output extension, else JPEG.
    pub fn export_format(&self) -> ExportFormat {
        self.format
            .or_else(|| ExportFormat::from_path(self.output_path()))
            .unwrap_or_default()
    }
}
