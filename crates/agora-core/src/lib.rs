//! # Agora Core
//!
//! Shared vocabulary for the Agora debate engine:
//! - [`DebatePhase`]: the ordered phases of a debate run
//! - [`KnowledgeReference`]: provenance record for a resolved reference marker
//! - [`KnowledgeLedger`]: append-only, debate-scoped list of references

pub mod phase;
pub mod reference;

pub use phase::DebatePhase;
pub use reference::{truncate_excerpt, KnowledgeLedger, KnowledgeReference, SourceType};
