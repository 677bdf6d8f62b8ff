//! Error types for knowledge retrieval

use agora_llm::LlmError;
use thiserror::Error;

/// Errors raised by a single knowledge source.
///
/// The resolver never propagates these; a failing source counts as a source
/// that found nothing.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// I/O error while listing or reading documents
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be turned into text
    #[error("Extraction failed for {path}: {reason}")]
    Extraction { path: String, reason: String },

    /// Web search transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Web search answered with something unparseable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A source did not answer within the configured limit
    #[error("Source timed out after {0}s")]
    Timeout(u64),

    /// The generative fallback failed
    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),
}

impl KnowledgeError {
    pub(crate) fn extraction(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Self::Extraction {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
