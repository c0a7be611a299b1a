//! Immutable `(question, answer) -> position` lookup.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::DataError;
use crate::question::QuestionId;

const COORDINATE_DATASET: &str = "coordinates";

/// One selectable bubble on the reference form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinateEntry {
    pub question_id: QuestionId,
    pub answer_label: String,
    /// Pixel column on the reference image.
    pub x: f64,
    /// Pixel row on the reference image.
    pub y: f64,
}

impl CoordinateEntry {
    pub fn new(
        question_id: impl Into<QuestionId>,
        answer_label: impl Into<String>,
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            answer_label: answer_label.into(),
            x,
            y,
        }
    }
}

/// Comparison form of an answer label: upper-cased, otherwise unchanged.
#[inline]
pub fn normalize_label(label: &str) -> String {
    label.to_uppercase()
}

type IndexKey = (QuestionId, String);

/// Lookup from `(question id, normalized answer label)` to an image position.
///
/// Built once, never mutated afterwards; share it behind an `Arc` across
/// concurrent invocations.
#[derive(Clone, Debug)]
pub struct CoordinateIndex {
    positions: HashMap<IndexKey, Point2<f64>>,
    /// Labels per question, in first-seen order, as written in the dataset.
    labels: HashMap<QuestionId, Vec<String>>,
    duplicates_skipped: usize,
}

impl CoordinateIndex {
    /// Build the index from coordinate entries.
    ///
    /// When two entries share a question id and (case-insensitively) an
    /// answer label, the first one wins and the later one is counted in
    /// [`CoordinateIndex::duplicates_skipped`].
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(entries), fields(entries = entries.len()))
    )]
    pub fn build(entries: &[CoordinateEntry]) -> Result<Self, DataError> {
        if entries.is_empty() {
            return Err(DataError::Empty {
                dataset: COORDINATE_DATASET.to_string(),
            });
        }

        let mut positions = HashMap::with_capacity(entries.len());
        let mut labels: HashMap<QuestionId, Vec<String>> = HashMap::new();
        let mut duplicates_skipped = 0;

        for (i, entry) in entries.iter().enumerate() {
            let row = i + 1;
            validate_entry(entry, row)?;

            let key = (entry.question_id.clone(), normalize_label(&entry.answer_label));
            match positions.entry(key) {
                Entry::Occupied(_) => {
                    duplicates_skipped += 1;
                    debug!(
                        "coordinate row {row}: duplicate Q{} option {} ignored",
                        entry.question_id, entry.answer_label
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(Point2::new(entry.x, entry.y));
                    labels
                        .entry(entry.question_id.clone())
                        .or_default()
                        .push(entry.answer_label.clone());
                }
            }
        }

        if duplicates_skipped > 0 {
            warn!("{duplicates_skipped} duplicate coordinate entries ignored (first entry wins)");
        }

        Ok(Self {
            positions,
            labels,
            duplicates_skipped,
        })
    }

    /// Position of the bubble for `answer_label` on `question_id`.
    ///
    /// Question ids compare exactly; labels compare after upper-casing.
    pub fn resolve(&self, question_id: &QuestionId, answer_label: &str) -> Option<Point2<f64>> {
        self.positions
            .get(&(question_id.clone(), normalize_label(answer_label)))
            .copied()
    }

    #[inline]
    pub fn contains(&self, question_id: &QuestionId, answer_label: &str) -> bool {
        self.resolve(question_id, answer_label).is_some()
    }

    /// Answer labels known for a question, in dataset order.
    pub fn answers_for(&self, question_id: &QuestionId) -> &[String] {
        self.labels.get(question_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct `(question, label)` pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of distinct questions.
    #[inline]
    pub fn question_count(&self) -> usize {
        self.labels.len()
    }

    /// Entries dropped because an earlier entry had the same key.
    #[inline]
    pub fn duplicates_skipped(&self) -> usize {
        self.duplicates_skipped
    }
}

fn validate_entry(entry: &CoordinateEntry, row: usize) -> Result<(), DataError> {
    let missing = |column: &str| DataError::MissingField {
        dataset: COORDINATE_DATASET.to_string(),
        row,
        column: column.to_string(),
    };
    if entry.question_id.is_empty() {
        return Err(missing("Question"));
    }
    if entry.answer_label.is_empty() {
        return Err(missing("Answer"));
    }
    for (column, value) in [("X", entry.x), ("Y", entry.y)] {
        if !value.is_finite() {
            return Err(DataError::InvalidNumber {
                dataset: COORDINATE_DATASET.to_string(),
                row,
                column: column.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
