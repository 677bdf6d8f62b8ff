//! Knowledge provenance: references recorded while resolving markers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::phase::DebatePhase;

/// Where a piece of knowledge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Substring match in a local document.
    LocalDocument,
    /// Result from the web search source.
    WebSearch,
    /// Text produced by the generative fallback.
    AiGenerated,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalDocument => write!(f, "Local Document"),
            Self::WebSearch => write!(f, "Web Search"),
            Self::AiGenerated => write!(f, "AI Generated"),
        }
    }
}

/// A single resolved reference, kept for provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeReference {
    /// The query text taken from the marker
    pub query: String,
    /// Which source answered
    pub source_type: SourceType,
    /// Truncated preview of the first result (never unbounded)
    pub source_excerpt: String,
    /// Name of the agent (or "Moderator") whose text carried the marker
    pub requesting_agent: String,
    /// Phase in which the marker was resolved
    pub phase: DebatePhase,
    /// When the reference was recorded
    pub timestamp: DateTime<Utc>,
}

impl KnowledgeReference {
    /// Create a reference, truncating the excerpt to `excerpt_limit` characters.
    pub fn new(
        query: &str,
        source_type: SourceType,
        content: &str,
        requesting_agent: &str,
        phase: DebatePhase,
        excerpt_limit: usize,
    ) -> Self {
        Self {
            query: query.to_string(),
            source_type,
            source_excerpt: truncate_excerpt(content, excerpt_limit),
            requesting_agent: requesting_agent.to_string(),
            phase,
            timestamp: Utc::now(),
        }
    }
}

/// Truncate `text` to at most `limit` characters, appending `...` when cut.
pub fn truncate_excerpt(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut excerpt: String = text.chars().take(limit).collect();
    excerpt.push_str("...");
    excerpt
}

/// Append-only, debate-scoped list of knowledge references.
///
/// Cloning yields another handle to the same ledger. Entries are never
/// mutated or removed once recorded.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeLedger {
    entries: Arc<RwLock<Vec<KnowledgeReference>>>,
}

impl KnowledgeLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reference
    pub async fn record(&self, reference: KnowledgeReference) {
        self.entries.write().await.push(reference);
    }

    /// Number of recorded references
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing has been recorded yet
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Copy of all entries in recording order
    pub async fn snapshot(&self) -> Vec<KnowledgeReference> {
        self.entries.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_excerpt() {
        assert_eq!(truncate_excerpt("short", 10), "short");
        assert_eq!(truncate_excerpt("abcdefghij", 4), "abcd...");
        // Multi-byte characters are never split
        assert_eq!(truncate_excerpt("ééééé", 2), "éé...");
    }

    #[test]
    fn test_reference_excerpt_is_bounded() {
        let long = "x".repeat(1000);
        let reference = KnowledgeReference::new(
            "query",
            SourceType::WebSearch,
            &long,
            "Morgan_Business",
            DebatePhase::Critiques,
            200,
        );
        assert_eq!(reference.source_excerpt.chars().count(), 203);
        assert_eq!(reference.requesting_agent, "Morgan_Business");
    }

    #[tokio::test]
    async fn test_ledger_shared_between_handles() {
        let ledger = KnowledgeLedger::new();
        let handle = ledger.clone();
        assert!(ledger.is_empty().await);

        handle
            .record(KnowledgeReference::new(
                "q",
                SourceType::LocalDocument,
                "doc.txt: text",
                "Moderator",
                DebatePhase::Welcome,
                200,
            ))
            .await;

        assert_eq!(ledger.len().await, 1);
        assert_eq!(ledger.snapshot().await[0].query, "q");
    }
}
