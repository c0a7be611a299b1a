//! JSON report of a marking run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use scantron_core::{count_marked, MarkOutcome};
use scantron_mark::{ExportFormat, MarkStyle};

use crate::config::RunConfig;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkReport {
    pub coords_path: String,
    pub image_path: String,
    pub answers_path: String,
    pub output_path: String,
    pub format: ExportFormat,
    pub style: MarkStyle,
    pub marked: usize,
    pub unresolved: usize,
    pub outcomes: Vec<MarkOutcome>,
}

impl MarkReport {
    /// Build a report for a finished run.
    pub fn new(cfg: &RunConfig, outcomes: Vec<MarkOutcome>) -> Self {
        let marked = count_marked(&outcomes);
        Self {
            coords_path: cfg.coords_path.clone(),
            image_path: cfg.image_path.clone(),
            answers_path: cfg.answers_path.clone(),
            output_path: cfg.output_path().to_string_lossy().into_owned(),
            format: cfg.export_format(),
            style: cfg.style,
            marked,
            unresolved: outcomes.len() - marked,
            outcomes,
        }
    }

    /// One human-readable line per outcome.
    pub fn log_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.outcomes.iter().map(ToString::to_string)
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Pretty JSON form of this report.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
