//! Core types and the coordinate index for scan-sheet answer marking.
//!
//! This crate is intentionally small. It knows nothing about image formats or
//! file layouts: it holds the question/answer identifiers, the immutable
//! [`CoordinateIndex`] that maps a `(question, answer)` pair to a pixel
//! position on the reference form, and the per-entry [`MarkOutcome`] log.

mod answer_key;
mod error;
mod index;
mod logger;
mod outcome;
mod question;

pub use answer_key::{validate_answer_key, AnswerKey, AnswerKeyEntry};
pub use error::{DataError, ValidationError};
pub use index::{normalize_label, CoordinateEntry, CoordinateIndex};
pub use outcome::{count_marked, MarkOutcome};
pub use question::QuestionId;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
