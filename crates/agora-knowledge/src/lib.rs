//! # Agora Knowledge
//!
//! Resolves `[REF: query]` markers in debate text through a layered chain:
//!
//! 1. **Local documents**: case-insensitive substring search over `.txt`,
//!    `.pdf` and `.docx` files in a directory
//! 2. **Web search**: a [`WebSearch`] client such as [`GoogleSearch`]
//! 3. **Generated knowledge**: a short bullet list from the LLM
//!
//! The first source with a non-empty answer wins. Every successful
//! resolution is recorded in a [`agora_core::KnowledgeLedger`].
//!
//! ```rust,ignore
//! use agora_knowledge::{KnowledgeConfig, KnowledgeResolver};
//!
//! let resolver = KnowledgeResolver::new(KnowledgeConfig::default(), llm);
//! let text = resolver
//!     .rewrite_references("Costs fell [REF: solar module prices]", "Moderator", DebatePhase::Welcome)
//!     .await;
//! ```

pub mod config;
pub mod documents;
pub mod error;
pub mod markers;
pub mod resolver;
pub mod web;

pub use config::KnowledgeConfig;
pub use documents::{DocumentStore, LocalDocument, SUPPORTED_EXTENSIONS};
pub use error::KnowledgeError;
pub use markers::{contains_integration_marker, contains_marker, strip_references};
pub use resolver::{KnowledgeResolver, Resolution, KNOWLEDGE_SYSTEM_PROMPT};
pub use web::{GoogleSearch, SearchHit, WebSearch};
