//! High-level facade for the `scantron-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core types ([`core`]) and the marking engine ([`mark`]),
//! - loaders for the coordinate and answer-key datasets (CSV or JSON),
//! - [`ReferenceAssets`], the load-once handle holding the coordinate index
//!   and the decoded reference image,
//! - a JSON run configuration and report, and the `scantron` binary
//!   (feature `cli`).
//!
//! ## Quickstart
//!
//! ```no_run
//! use scantron::{dataset, ReferenceAssets};
//! use scantron::mark::{encode, ExportFormat, MarkStyle, DEFAULT_QUALITY};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let assets = ReferenceAssets::load("coordinates.csv", "sheet.jpg")?;
//! let key = dataset::load_answer_key("key.csv")?;
//!
//! let (annotated, outcomes) = assets.annotate(key.entries(), &MarkStyle::default())?;
//! for outcome in &outcomes {
//!     println!("{outcome}");
//! }
//! std::fs::write("marked.jpg", encode(&annotated, ExportFormat::Jpeg, DEFAULT_QUALITY)?)?;
//! # Ok(())
//! # }
//! ```

pub use scantron_core as core;
pub use scantron_mark as mark;

pub use scantron_core::{
    AnswerKey, AnswerKeyEntry, CoordinateEntry, CoordinateIndex, DataError, MarkOutcome,
    QuestionId, ValidationError,
};
pub use scantron_mark::{AnnotateError, AnnotatedImage, ExportFormat, ImageError, MarkStyle};

pub mod assets;
pub mod config;
pub mod dataset;
mod error;
pub mod report;
pub mod run;

pub use assets::ReferenceAssets;
pub use config::RunConfig;
pub use error::{ConfigError, ScantronError};
pub use report::MarkReport;
pub use run::{run, RunSummary};
