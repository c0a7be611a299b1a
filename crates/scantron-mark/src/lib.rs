//! Marking engine for scan-sheet reference forms.
//!
//! Pipeline:
//! - resolve every answer-key entry against a [`CoordinateIndex`],
//! - record one [`MarkOutcome`] per entry (misses included),
//! - composite a circular marker at every resolved position onto a fresh
//!   copy of the reference image.
//!
//! Encoding the result is a separate step ([`export::encode`]) so the engine
//! itself can be tested without an encoder.
//!
//! [`CoordinateIndex`]: scantron_core::CoordinateIndex
//! [`MarkOutcome`]: scantron_core::MarkOutcome

mod engine;
mod error;
pub mod export;
pub mod render;
mod style;

pub use engine::{annotate, resolve_outcomes, AnnotateError, AnnotatedImage};
pub use error::ImageError;
pub use export::{encode, ExportFormat, UnknownFormat, DEFAULT_FILE_NAME, DEFAULT_QUALITY};
pub use render::{composite, draw_marker, Marker};
pub use style::{Color, ColorParseError, MarkStyle};
