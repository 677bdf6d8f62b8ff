//! # Agora Debate
//!
//! Structured multi-persona debates with a moderator.
//!
//! A run walks a fixed sequence of phases:
//!
//! `Welcome → Perspectives → Critiques → Responses → CommonGround → FinalPositions → Synthesis → Artifacts`
//!
//! ## Key Types
//!
//! - [`PersonaAgent`]: a participant with a fixed identity and a replaceable directive
//! - [`DebateOrchestrator`]: drives the phases and integrates knowledge references
//! - [`DebateTranscript`]: the structured record of a run
//! - [`EvolutionAnalysis`]: keyword and tone drift across the debate
//! - [`ArtifactWriter`]: saves the report, narratives, diagrams and JSON dump
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agora_debate::{DebateConfig, DebateOrchestrator, PersonaAgent};
//! use agora_llm::MockProvider;
//! use std::sync::Arc;
//!
//! let agents = PersonaAgent::from_keys(&["business", "creative"])?;
//! let orchestrator = DebateOrchestrator::new(Arc::new(MockProvider::smart()), DebateConfig::default());
//! let outcome = orchestrator.run("How should cities adopt e-bikes?", agents).await?;
//! println!("{}", outcome.transcript.final_report());
//! ```

pub mod analytics;
pub mod artifacts;
pub mod error;
pub mod orchestrator;
pub mod persist;
pub mod persona;
pub mod prompts;
pub mod transcript;

pub use analytics::{
    analyze_sentiment, extract_keywords, parse_sentiment, AgentJourney, EvolutionAnalysis,
    SentimentCategory, Stage, ThemeShift,
};
pub use error::{DebateError, PersistError, PersonaError, TranscriptError};
pub use orchestrator::{
    select_critique_target, DebateConfig, DebateOrchestrator, DebateOutcome, TokenCaps, MIN_AGENTS,
};
pub use persist::{load_transcript, ArtifactWriter, PersistReport};
pub use persona::{PersonaAgent, PersonaIdentity, PersonaKind, QueryTemplate};
pub use transcript::{AgentResponse, DebateTranscript, ModeratorCue, PhaseOutputs};
