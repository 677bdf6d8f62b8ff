//! Resolver configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the knowledge resolver.
///
/// Passed explicitly to [`crate::KnowledgeResolver::new`]; nothing here is
/// read from the process environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Directory scanned for `.txt`, `.pdf` and `.docx` files
    pub document_dir: PathBuf,
    /// Consult the web search source after local documents
    pub use_web_search: bool,
    /// Fall back to generated bullet points when nothing else matched
    pub use_ai_generation: bool,
    /// Characters kept before a local match
    pub snippet_before: usize,
    /// Characters kept after the start of a local match
    pub snippet_after: usize,
    /// Web results kept per query
    pub max_web_results: usize,
    /// Ledger excerpt length in characters
    pub excerpt_limit: usize,
    /// Limit on each source call, in seconds
    pub call_timeout_secs: u64,
    /// Result-length cap for generated knowledge
    pub generation_max_tokens: u32,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            document_dir: PathBuf::from("documents"),
            use_web_search: true,
            use_ai_generation: true,
            snippet_before: 100,
            snippet_after: 300,
            max_web_results: 5,
            excerpt_limit: 200,
            call_timeout_secs: 30,
            generation_max_tokens: 500,
        }
    }
}

impl KnowledgeConfig {
    /// Config rooted at a document directory, other settings default
    pub fn with_document_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            document_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Only local documents; no web search, no generation
    pub fn local_only(dir: impl Into<PathBuf>) -> Self {
        Self {
            use_web_search: false,
            use_ai_generation: false,
            ..Self::with_document_dir(dir)
        }
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KnowledgeConfig::default();
        assert_eq!(config.snippet_before, 100);
        assert_eq!(config.snippet_after, 300);
        assert_eq!(config.max_web_results, 5);
        assert_eq!(config.excerpt_limit, 200);
        assert_eq!(config.call_timeout(), Duration::from_secs(30));
        assert!(config.use_web_search && config.use_ai_generation);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: KnowledgeConfig =
            serde_json::from_str(r#"{"document_dir":"papers","use_web_search":false}"#).unwrap();
        assert_eq!(config.document_dir, PathBuf::from("papers"));
        assert!(!config.use_web_search);
        assert_eq!(config.snippet_after, 300);
    }
}
