use std::fmt;

use serde::{Deserialize, Serialize};

use crate::question::QuestionId;

/// Result of resolving one answer-key entry.
///
/// A miss is an ordinary outcome, not an error. The `Display` form is the
/// log line shown to users.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MarkOutcome {
    Marked {
        question_id: QuestionId,
        answer_label: String,
        x: f64,
        y: f64,
    },
    Unresolved {
        question_id: QuestionId,
        answer_label: String,
    },
}

impl MarkOutcome {
    pub fn question_id(&self) -> &QuestionId {
        match self {
            MarkOutcome::Marked { question_id, .. } | MarkOutcome::Unresolved { question_id, .. } => {
                question_id
            }
        }
    }

    pub fn answer_label(&self) -> &str {
        match self {
            MarkOutcome::Marked { answer_label, .. }
            | MarkOutcome::Unresolved { answer_label, .. } => answer_label,
        }
    }

    #[inline]
    pub fn is_marked(&self) -> bool {
        matches!(self, MarkOutcome::Marked { .. })
    }

    /// Marker position for `Marked`, `None` otherwise.
    pub fn position(&self) -> Option<(f64, f64)> {
        match *self {
            MarkOutcome::Marked { x, y, .. } => Some((x, y)),
            MarkOutcome::Unresolved { .. } => None,
        }
    }
}

impl fmt::Display for MarkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkOutcome::Marked {
                question_id,
                answer_label,
                x,
                y,
            } => write!(
                f,
                "Highlighted Q{question_id} Option {answer_label} at (x={x:.2}, y={y:.2})"
            ),
            MarkOutcome::Unresolved {
                question_id,
                answer_label,
            } => write!(
                f,
                "Coordinate for Q{question_id} Option {answer_label} not found."
            ),
        }
    }
}

/// Number of `Marked` outcomes in a log.
pub fn count_marked(outcomes: &[MarkOutcome]) -> usize {
    outcomes.iter().filter(|o| o.is_marked()).count()
}
