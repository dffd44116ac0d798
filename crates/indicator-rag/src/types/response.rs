//! Retrieval matches and generation results

use serde::{Deserialize, Serialize};

use super::record::Metadata;

/// A single retrieval result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Unit content
    pub content: String,
    /// Unit metadata
    pub metadata: Metadata,
    /// Similarity score, higher is more similar
    pub score: f32,
}

impl Match {
    /// Create a match
    pub fn new(content: impl Into<String>, metadata: Metadata, score: f32) -> Self {
        Self {
            content: content.into(),
            metadata,
            score,
        }
    }
}

/// Which terminal state produced a generation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// A genuine model completion
    Completion,
    /// Retrieval returned nothing; no backend was called
    NoContext,
    /// Retrieval or the backend failed
    Error,
    /// The external backend answered without a `response` key
    UnexpectedFormat,
}

/// Outcome of `ask`. `text` reads the same whether it is a completion or a
/// canned fallback; `kind` says which.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Answer text
    pub text: String,
    /// Terminal state tag
    pub kind: ResultKind,
}

impl GenerationResult {
    /// A model completion
    pub fn completion(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ResultKind::Completion,
        }
    }

    /// A canned fallback
    pub fn fallback(kind: ResultKind, text: &str) -> Self {
        Self {
            text: text.to_string(),
            kind,
        }
    }

    /// Whether this is a canned fallback rather than a completion
    pub fn is_fallback(&self) -> bool {
        self.kind != ResultKind::Completion
    }
}

impl From<GenerationResult> for String {
    fn from(result: GenerationResult) -> Self {
        result.text
    }
}
