use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque question identifier.
///
/// Integer and text identifiers never compare equal: `Int(1) != Text("1")`.
/// Callers that mix sources must normalize before building keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Int(i64),
    Text(String),
}

impl QuestionId {
    /// Interpret a raw tabular cell: integers become `Int`, everything else `Text`.
    ///
    /// This is the rule used for CSV input and command-line arguments, where
    /// no type information survives.
    pub fn from_cell(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) => QuestionId::Int(n),
            Err(_) => QuestionId::Text(raw.to_string()),
        }
    }

    /// `true` for an empty text token. Integer ids are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            QuestionId::Int(_) => false,
            QuestionId::Text(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Int(n) => write!(f, "{n}"),
            QuestionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for QuestionId {
    fn from(n: i64) -> Self {
        QuestionId::Int(n)
    }
}

impl From<i32> for QuestionId {
    fn from(n: i32) -> Self {
        QuestionId::Int(i64::from(n))
    }
}

impl From<u32> for QuestionId {
    fn from(n: u32) -> Self {
        QuestionId::Int(i64::from(n))
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId::Text(s.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(s: String) -> Self {
        QuestionId::Text(s)
    }
}
