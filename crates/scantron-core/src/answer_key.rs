use std::collections::HashMap;
use std::fmt::Write as _;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::question::QuestionId;

/// One question with the answer to mark on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    pub question_id: QuestionId,
    pub answer_label: String,
}

impl AnswerKeyEntry {
    pub fn new(question_id: impl Into<QuestionId>, answer_label: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer_label: answer_label.into(),
        }
    }
}

/// Ordered answer key with one entry per question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerKey {
    entries: Vec<AnswerKeyEntry>,
}

impl AnswerKey {
    /// Collapse rows into a question -> answer mapping.
    ///
    /// A repeated question keeps the position of its first row and takes the
    /// answer of its last row.
    pub fn from_rows(rows: impl IntoIterator<Item = AnswerKeyEntry>) -> Self {
        let mut entries: Vec<AnswerKeyEntry> = Vec::new();
        let mut slots: HashMap<QuestionId, usize> = HashMap::new();

        for row in rows {
            match slots.get(&row.question_id) {
                Some(&slot) => {
                    warn!(
                        "answer key: Q{} listed again, answer {} replaces {}",
                        row.question_id, row.answer_label, entries[slot].answer_label
                    );
                    entries[slot].answer_label = row.answer_label;
                }
                None => {
                    slots.insert(row.question_id.clone(), entries.len());
                    entries.push(row);
                }
            }
        }

        Self { entries }
    }

    #[inline]
    pub fn entries(&self) -> &[AnswerKeyEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the key is non-empty and every entry has both fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_answer_key(&self.entries)
    }

    /// Plain-text `Question | Answer` table of the key, one row per entry.
    pub fn reference_table(&self) -> String {
        const Q_HEADER: &str = "Question";
        const A_HEADER: &str = "Answer";

        let questions: Vec<String> = self
            .entries
            .iter()
            .map(|e| e.question_id.to_string())
            .collect();
        let q_width = questions
            .iter()
            .map(|q| q.chars().count())
            .chain([Q_HEADER.len()])
            .max()
            .unwrap_or(Q_HEADER.len());
        let a_width = self
            .entries
            .iter()
            .map(|e| e.answer_label.chars().count())
            .chain([A_HEADER.len()])
            .max()
            .unwrap_or(A_HEADER.len());

        let mut out = String::new();
        let _ = writeln!(out, "{Q_HEADER:<q_width$} | {A_HEADER:<a_width$}");
        let _ = writeln!(out, "{}-+-{}", "-".repeat(q_width), "-".repeat(a_width));
        for (q, entry) in questions.iter().zip(&self.entries) {
            let _ = writeln!(out, "{q:<q_width$} | {:<a_width$}", entry.answer_label);
        }
        out
    }
}

impl From<Vec<AnswerKeyEntry>> for AnswerKey {
    /// Wrap entries as given, without collapsing repeated questions.
    fn from(entries: Vec<AnswerKeyEntry>) -> Self {
        Self { entries }
    }
}

impl AsRef<[AnswerKeyEntry]> for AnswerKey {
    fn as_ref(&self) -> &[AnswerKeyEntry] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a AnswerKey {
    type Item = &'a AnswerKeyEntry;
    type IntoIter = std::slice::Iter<'a, AnswerKeyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Validate a raw entry slice: non-empty, no blank question ids or labels.
pub fn validate_answer_key(entries: &[AnswerKeyEntry]) -> Result<(), ValidationError> {
    if entries.is_empty() {
        return Err(ValidationError::EmptyAnswerKey);
    }
    for (position, entry) in entries.iter().enumerate() {
        if entry.question_id.is_empty() {
            return Err(ValidationError::EmptyQuestionId { position });
        }
        if entry.answer_label.is_empty() {
            return Err(ValidationError::EmptyAnswerLabel {
                position,
                question: entry.question_id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_question_keeps_first_slot_and_last_answer() {
        let key = AnswerKey::from_rows([
            AnswerKeyEntry::new(1, "A"),
            AnswerKeyEntry::new(2, "B"),
            AnswerKeyEntry::new(1, "D"),
        ]);
        assert_eq!(
            key.entries(),
            [AnswerKeyEntry::new(1, "D"), AnswerKeyEntry::new(2, "B")]
        );
    }

    #[test]
    fn validation_reports_position() {
        assert_eq!(
            AnswerKey::default().validate(),
            Err(ValidationError::EmptyAnswerKey)
        );

        let key = AnswerKey::from(vec![
            AnswerKeyEntry::new(1, "A"),
            AnswerKeyEntry::new("", "B"),
        ]);
        assert_eq!(
            key.validate(),
            Err(ValidationError::EmptyQuestionId { position: 1 })
        );

        let key = AnswerKey::from(vec![AnswerKeyEntry::new(7, "")]);
        assert_eq!(
            key.validate(),
            Err(ValidationError::EmptyAnswerLabel {
                position: 0,
                question: QuestionId::Int(7),
            })
        );
    }

    #[test]
    fn reference_table_aligns_columns() {
        let key = AnswerKey::from_rows([
            AnswerKeyEntry::new(1, "A"),
            AnswerKeyEntry::new(120, "C"),
        ]);
        let table = key.reference_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(
            lines,
            [
                "Question | Answer",
                "---------+-------",
                "1        | A     ",
                "120      | C     ",
            ]
        );
    }
}
