//! Error types for debate setup, transcript bookkeeping and persistence

use agora_core::DebatePhase;
use thiserror::Error;

/// Startup errors. These abort a run before any phase begins.
#[derive(Debug, Error)]
pub enum DebateError {
    #[error("At least {min} agents are required to start a debate, got {got}")]
    TooFewAgents { min: usize, got: usize },

    #[error("Agent name '{0}' is used more than once")]
    DuplicateAgent(String),

    #[error("Unknown persona type '{0}' (expected business, creative, critical or technical)")]
    UnknownPersona(String),

    #[error("Problem statement is empty")]
    EmptyProblem,

    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),
}

/// Violations of the transcript's ordering and membership rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("Phase '{0}' recorded out of order")]
    PhaseOutOfOrder(DebatePhase),

    #[error("Agent '{0}' is not part of this debate")]
    UnknownAgent(String),
}

/// Errors from a persona's argument capability
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersonaError {
    #[error("Knowledge integration is not available")]
    KnowledgeUnavailable,

    #[error("Topic is empty")]
    EmptyTopic,
}

/// Errors writing run artifacts
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
