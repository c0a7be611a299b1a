use crate::question::QuestionId;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Malformed or empty coordinate / answer-key dataset.
///
/// Every variant names the dataset it came from (a file path or a logical
/// name such as `"coordinates"`). Row numbers are 1-based data rows, not
/// counting the header.
#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("{dataset}: dataset is empty")]
    Empty { dataset: String },

    #[error("{dataset}: required column `{column}` is missing")]
    MissingColumn { dataset: String, column: String },

    #[error("{dataset}: row {row}: column `{column}` has no value")]
    MissingField {
        dataset: String,
        row: usize,
        column: String,
    },

    #[error("{dataset}: row {row}: column `{column}` is not a finite number ({value:?})")]
    InvalidNumber {
        dataset: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{dataset}: row {row}: column `{column}` has unsupported value {value}")]
    UnsupportedValue {
        dataset: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{dataset}: unsupported dataset format (expected .csv or .json)")]
    UnsupportedFormat { dataset: String },

    #[error("{dataset}: {source}")]
    Io {
        dataset: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{dataset}: parse error: {source}")]
    Parse {
        dataset: String,
        #[source]
        source: BoxedSource,
    },
}

impl DataError {
    /// Name of the dataset this error refers to.
    pub fn dataset(&self) -> &str {
        match self {
            DataError::Empty { dataset }
            | DataError::MissingColumn { dataset, .. }
            | DataError::MissingField { dataset, .. }
            | DataError::InvalidNumber { dataset, .. }
            | DataError::UnsupportedValue { dataset, .. }
            | DataError::UnsupportedFormat { dataset }
            | DataError::Io { dataset, .. }
            | DataError::Parse { dataset, .. } => dataset,
        }
    }

    pub fn parse(dataset: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        DataError::Parse {
            dataset: dataset.into(),
            source: source.into(),
        }
    }
}

/// Rejected answer key or marker style.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("answer key is empty")]
    EmptyAnswerKey,

    #[error("answer key entry {position}: question id is empty")]
    EmptyQuestionId { position: usize },

    #[error("answer key entry {position} (Q{question}): answer label is empty")]
    EmptyAnswerLabel {
        position: usize,
        question: QuestionId,
    },

    #[error("invalid marker style: {field} {reason}")]
    InvalidStyle {
        field: &'static str,
        reason: &'static str,
    },
}
