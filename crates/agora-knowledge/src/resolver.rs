//! Layered knowledge resolution: local documents, then web search, then
//! generated knowledge.

use agora_core::{truncate_excerpt, DebatePhase, KnowledgeLedger, KnowledgeReference, SourceType};
use agora_llm::{LlmProvider, LlmRequest};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::KnowledgeConfig;
use crate::documents::DocumentStore;
use crate::error::KnowledgeError;
use crate::markers::{self, format_generated, format_not_found, format_reference};
use crate::web::{SearchHit, WebSearch};

/// System directive for the generative fallback
pub const KNOWLEDGE_SYSTEM_PROMPT: &str = "You are a knowledge base that provides factual, concise information. \
When asked about a topic, provide 3-5 key points that would be helpful for a debate or discussion. \
Focus on current understanding, trends, and important considerations. Format as bullet points.";

/// Result of a successful lookup: which source answered, and its ranked snippets.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub source_type: SourceType,
    pub snippets: Vec<String>,
}

impl Resolution {
    /// Most relevant snippet
    pub fn first(&self) -> &str {
        self.snippets.first().map(String::as_str).unwrap_or_default()
    }

    /// Snippets beyond the first
    pub fn extra(&self) -> usize {
        self.snippets.len().saturating_sub(1)
    }

    /// Inline annotation replacing a marker for `query`.
    pub fn annotate(&self, query: &str) -> String {
        match self.source_type {
            SourceType::AiGenerated => format_generated(query, self.first()),
            SourceType::LocalDocument | SourceType::WebSearch => {
                format_reference(query, self.first(), self.extra())
            }
        }
    }

    /// Like [`Resolution::annotate`] but with the snippet cut to `limit` characters.
    pub fn annotate_brief(&self, query: &str, limit: usize) -> String {
        let excerpt = truncate_excerpt(self.first(), limit);
        match self.source_type {
            SourceType::AiGenerated => format_generated(query, &excerpt),
            SourceType::LocalDocument | SourceType::WebSearch => {
                format_reference(query, &excerpt, 0)
            }
        }
    }
}

fn non_empty(snippets: Vec<String>) -> Option<Vec<String>> {
    let snippets: Vec<String> = snippets
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect();
    (!snippets.is_empty()).then_some(snippets)
}

/// The knowledge resolver.
///
/// Owns the debate-scoped ledger; every successful [`resolve_query`] appends
/// exactly one entry. Source failures are logged and treated as "no result".
///
/// [`resolve_query`]: KnowledgeResolver::resolve_query
#[derive(Debug)]
pub struct KnowledgeResolver<L: LlmProvider> {
    config: KnowledgeConfig,
    documents: DocumentStore,
    web: Option<Arc<dyn WebSearch>>,
    llm: Arc<L>,
    ledger: KnowledgeLedger,
}

impl<L: LlmProvider> KnowledgeResolver<L> {
    pub fn new(config: KnowledgeConfig, llm: Arc<L>) -> Self {
        info!(
            document_dir = %config.document_dir.display(),
            use_web_search = config.use_web_search,
            use_ai_generation = config.use_ai_generation,
            "Knowledge resolver initialized"
        );
        let documents = DocumentStore::new(&config.document_dir);
        documents.check_directory();

        Self {
            config,
            documents,
            web: None,
            llm,
            ledger: KnowledgeLedger::new(),
        }
    }

    /// Attach a web search client (used only when `use_web_search` is set)
    pub fn with_web_search(mut self, web: Arc<dyn WebSearch>) -> Self {
        self.web = Some(web);
        self
    }

    /// Record into an existing ledger instead of a fresh one
    pub fn with_ledger(mut self, ledger: KnowledgeLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    pub fn ledger(&self) -> &KnowledgeLedger {
        &self.ledger
    }

    /// Run the chain without recording anything.
    pub async fn probe(&self, query: &str) -> Option<Resolution> {
        self.run_chain(query).await
    }

    /// Run the chain and record the first snippet of a hit in the ledger.
    pub async fn resolve_query(
        &self,
        query: &str,
        requesting_agent: &str,
        phase: DebatePhase,
    ) -> Option<Resolution> {
        let resolution = self.run_chain(query).await?;
        self.ledger
            .record(KnowledgeReference::new(
                query.trim(),
                resolution.source_type,
                resolution.first(),
                requesting_agent,
                phase,
                self.config.excerpt_limit,
            ))
            .await;
        Some(resolution)
    }

    /// Replace every `[REF: ...]` marker in `text` with its resolved form.
    ///
    /// Text without markers comes back unchanged, and the output never
    /// contains a request marker.
    pub async fn rewrite_references(
        &self,
        text: &str,
        requesting_agent: &str,
        phase: DebatePhase,
    ) -> String {
        let found = markers::find_markers(text);
        if found.is_empty() {
            return text.to_string();
        }
        info!(agent = %requesting_agent, phase = %phase, count = found.len(), "Processing reference requests");

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for marker in &found {
            out.push_str(&text[last..marker.start]);
            let replacement = if marker.query.is_empty() {
                format_not_found("")
            } else {
                match self.resolve_query(&marker.query, requesting_agent, phase).await {
                    Some(resolution) => resolution.annotate(&marker.query),
                    None => format_not_found(&marker.query),
                }
            };
            out.push_str(&replacement);
            last = marker.end;
        }
        out.push_str(&text[last..]);
        out
    }

    async fn run_chain(&self, query: &str) -> Option<Resolution> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        info!(query = %query, "Knowledge request");

        if let Some(snippets) = self.search_local(query).await {
            info!(query = %query, count = snippets.len(), "Local knowledge found");
            return Some(Resolution {
                source_type: SourceType::LocalDocument,
                snippets,
            });
        }

        if self.config.use_web_search {
            if let Some(snippets) = self.search_web(query).await {
                info!(query = %query, count = snippets.len(), "Web results found");
                return Some(Resolution {
                    source_type: SourceType::WebSearch,
                    snippets,
                });
            }
        }

        if self.config.use_ai_generation {
            if let Some(snippets) = self.generate(query).await {
                info!(query = %query, "Generated knowledge");
                return Some(Resolution {
                    source_type: SourceType::AiGenerated,
                    snippets,
                });
            }
        }

        warn!(query = %query, "No knowledge found after trying all sources");
        None
    }

    /// Await a source under the configured timeout; failures become `None`.
    async fn bounded<T, F>(&self, source: &str, call: F) -> Option<T>
    where
        F: Future<Output = Result<T, KnowledgeError>>,
    {
        match tokio::time::timeout(self.config.call_timeout(), call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(source = %source, error = %e, "Knowledge source failed");
                None
            }
            Err(_) => {
                let e = KnowledgeError::Timeout(self.config.call_timeout_secs);
                warn!(source = %source, error = %e, "Knowledge source failed");
                None
            }
        }
    }

    async fn search_local(&self, query: &str) -> Option<Vec<String>> {
        let hits = self
            .bounded("local", async {
                Ok::<_, KnowledgeError>(
                    self.documents
                        .search(query, self.config.snippet_before, self.config.snippet_after)
                        .await,
                )
            })
            .await?;
        non_empty(hits)
    }

    async fn search_web(&self, query: &str) -> Option<Vec<String>> {
        let Some(web) = &self.web else {
            debug!("Web search enabled but no client configured");
            return None;
        };
        let hits = self
            .bounded(web.name(), web.search(query, self.config.max_web_results))
            .await?;
        non_empty(hits.iter().map(SearchHit::render).collect())
    }

    async fn generate(&self, query: &str) -> Option<Vec<String>> {
        let request = LlmRequest::with_role(
            KNOWLEDGE_SYSTEM_PROMPT,
            &format!("Provide current knowledge about: {}", query),
        )
        .max_tokens(self.config.generation_max_tokens);

        let response = self
            .bounded("generative", async {
                let response = self.llm.complete(request).await?;
                Ok::<_, KnowledgeError>(response)
            })
            .await?;
        non_empty(vec![response.content.trim().to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_llm::MockProvider;
    use tempfile::TempDir;

    fn resolver_in(dir: &TempDir, llm: MockProvider) -> KnowledgeResolver<MockProvider> {
        KnowledgeResolver::new(KnowledgeConfig::local_only(dir.path()), Arc::new(llm))
    }

    #[tokio::test]
    async fn test_probe_does_not_record() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "Wind power is growing").unwrap();
        let resolver = resolver_in(&dir, MockProvider::smart());

        assert!(resolver.probe("wind power").await.is_some());
        assert!(resolver.ledger().is_empty().await);

        let hit = resolver
            .resolve_query("wind power", "Nova_Creative", DebatePhase::Perspectives)
            .await
            .unwrap();
        assert_eq!(hit.source_type, SourceType::LocalDocument);
        assert_eq!(resolver.ledger().len().await, 1);
    }

    #[tokio::test]
    async fn test_rewrite_mixed_markers() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "Tidal energy is predictable").unwrap();
        std::fs::write(dir.path().join("b.txt"), "tidal ENERGY costs fall").unwrap();
        let resolver = resolver_in(&dir, MockProvider::smart());

        let text = "Consider [REF: tidal energy]; also [REF: cold fusion] and [REF: ].";
        let out = resolver
            .rewrite_references(text, "Moderator", DebatePhase::Welcome)
            .await;

        assert!(out.starts_with("Consider [Reference for 'tidal energy': a.txt: "));
        assert!(out.contains("(+ 1 more references)]"));
        assert!(out.contains("[No reference information found for 'cold fusion']"));
        assert!(out.ends_with("[No reference information found for '']."));
        assert_eq!(resolver.ledger().len().await, 1);
    }

    #[tokio::test]
    async fn test_generated_fallback_annotation() {
        let dir = TempDir::new().unwrap();
        let config = KnowledgeConfig {
            use_web_search: false,
            ..KnowledgeConfig::with_document_dir(dir.path())
        };
        let llm = Arc::new(MockProvider::constant("- point one\n- point two"));
        let resolver = KnowledgeResolver::new(config, llm.clone());

        let out = resolver
            .rewrite_references("[REF: edge computing]", "DrAda_Technical", DebatePhase::Critiques)
            .await;
        assert_eq!(
            out,
            "[AI-generated knowledge for 'edge computing': - point one\n- point two]"
        );

        let request = &llm.requests()[0];
        assert_eq!(request.system, KNOWLEDGE_SYSTEM_PROMPT);
        assert_eq!(request.max_tokens, 500);

        let ledger = resolver.ledger().snapshot().await;
        assert_eq!(ledger[0].source_type, SourceType::AiGenerated);
        assert_eq!(ledger[0].phase, DebatePhase::Critiques);
    }

    #[tokio::test]
    async fn test_generation_failure_is_absence() {
        let dir = TempDir::new().unwrap();
        let config = KnowledgeConfig {
            use_web_search: false,
            ..KnowledgeConfig::with_document_dir(dir.path())
        };
        let resolver = KnowledgeResolver::new(config, Arc::new(MockProvider::failing("offline")));

        assert!(resolver.probe("anything").await.is_none());
    }

    #[test]
    fn test_annotate_brief_truncates() {
        let resolution = Resolution {
            source_type: SourceType::WebSearch,
            snippets: vec!["x".repeat(500), "second".to_string()],
        };
        let brief = resolution.annotate_brief("q", 200);
        assert_eq!(brief, format!("[Reference for 'q': {}...]", "x".repeat(200)));
    }
}
