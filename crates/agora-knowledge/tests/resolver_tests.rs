//! Fallback-chain and marker-rewriting behaviour of the knowledge resolver

use agora_core::{DebatePhase, SourceType};
use agora_knowledge::{
    KnowledgeConfig, KnowledgeError, KnowledgeResolver, SearchHit, WebSearch,
};
use agora_llm::MockProvider;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Web search double that counts calls and returns fixed hits
#[derive(Debug, Default)]
struct RecordingSearch {
    hits: Vec<SearchHit>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl RecordingSearch {
    fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearch for RecordingSearch {
    fn name(&self) -> &str {
        "recording"
    }

    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchHit>, KnowledgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.hits.iter().take(limit).cloned().collect())
    }
}

/// Web search double that always errors
#[derive(Debug)]
struct BrokenSearch;

#[async_trait]
impl WebSearch for BrokenSearch {
    fn name(&self) -> &str {
        "broken"
    }

    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>, KnowledgeError> {
        Err(KnowledgeError::Network("connection reset".to_string()))
    }
}

fn full_chain(dir: &TempDir) -> KnowledgeConfig {
    KnowledgeConfig::with_document_dir(dir.path())
}

#[tokio::test]
async fn test_local_hit_skips_web_and_generation() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("brief.txt"),
        "Fact-checking pipelines reduce hallucinations in generated reports.",
    )
    .unwrap();

    let web = Arc::new(RecordingSearch::with_hits(vec![SearchHit::new("t", "s", "l")]));
    let llm = Arc::new(MockProvider::smart());
    let resolver =
        KnowledgeResolver::new(full_chain(&dir), llm.clone()).with_web_search(web.clone());

    let resolution = resolver
        .resolve_query("fact-checking pipelines", "Sage_Critical", DebatePhase::Critiques)
        .await
        .unwrap();

    assert_eq!(resolution.source_type, SourceType::LocalDocument);
    assert_eq!(web.calls(), 0);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_web_hit_skips_generation() {
    let dir = TempDir::new().unwrap();
    let web = Arc::new(RecordingSearch::with_hits(vec![
        SearchHit::new("Audit trails", "Provenance improves trust", "https://a.example"),
        SearchHit::new("Citations", "Sources let readers verify", "https://b.example"),
    ]));
    let llm = Arc::new(MockProvider::smart());
    let resolver =
        KnowledgeResolver::new(full_chain(&dir), llm.clone()).with_web_search(web.clone());

    let out = resolver
        .rewrite_references("Trust needs [REF: provenance]", "Morgan_Business", DebatePhase::Responses)
        .await;

    assert_eq!(
        out,
        "Trust needs [Reference for 'provenance': Audit trails: Provenance improves trust \
         [Source: https://a.example] (+ 1 more references)]"
    );
    assert_eq!(web.calls(), 1);
    assert_eq!(llm.call_count(), 0);

    let ledger = resolver.ledger().snapshot().await;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].source_type, SourceType::WebSearch);
    assert_eq!(ledger[0].requesting_agent, "Morgan_Business");
    assert_eq!(ledger[0].phase, DebatePhase::Responses);
}

#[tokio::test]
async fn test_disabled_web_is_never_called() {
    let dir = TempDir::new().unwrap();
    let web = Arc::new(RecordingSearch::with_hits(vec![SearchHit::new("t", "s", "l")]));
    let config = KnowledgeConfig {
        use_web_search: false,
        use_ai_generation: false,
        ..full_chain(&dir)
    };
    let resolver =
        KnowledgeResolver::new(config, Arc::new(MockProvider::smart())).with_web_search(web.clone());

    assert!(resolver.probe("anything").await.is_none());
    assert_eq!(web.calls(), 0);
}

#[tokio::test]
async fn test_failing_sources_degrade_to_generation() {
    let dir = TempDir::new().unwrap();
    let llm = Arc::new(MockProvider::constant("- generated fact"));
    let resolver = KnowledgeResolver::new(full_chain(&dir), llm.clone())
        .with_web_search(Arc::new(BrokenSearch));

    let resolution = resolver.probe("battery recycling").await.unwrap();
    assert_eq!(resolution.source_type, SourceType::AiGenerated);
    assert_eq!(resolution.snippets, vec!["- generated fact".to_string()]);
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_slow_web_search_times_out() {
    let dir = TempDir::new().unwrap();
    let web = Arc::new(RecordingSearch {
        hits: vec![SearchHit::new("late", "too late", "l")],
        delay: Some(Duration::from_secs(5)),
        ..RecordingSearch::default()
    });
    let config = KnowledgeConfig {
        call_timeout_secs: 1,
        use_ai_generation: false,
        ..full_chain(&dir)
    };
    let resolver =
        KnowledgeResolver::new(config, Arc::new(MockProvider::smart())).with_web_search(web.clone());

    assert!(resolver.probe("slow topic").await.is_none());
    assert_eq!(web.calls(), 1);
}

#[tokio::test]
async fn test_text_without_markers_is_unchanged() {
    let dir = TempDir::new().unwrap();
    let llm = Arc::new(MockProvider::smart());
    let resolver = KnowledgeResolver::new(full_chain(&dir), llm.clone());

    for text in [
        "",
        "Plain prose with [brackets] and REF: but no marker.",
        "[Reference for 'x': already resolved]",
        "[No reference information found for 'y']",
    ] {
        let once = resolver
            .rewrite_references(text, "Moderator", DebatePhase::Welcome)
            .await;
        assert_eq!(once, text);
    }
    assert_eq!(llm.call_count(), 0);
    assert!(resolver.ledger().is_empty().await);
}

#[tokio::test]
async fn test_no_marker_survives_rewriting() {
    let dir = TempDir::new().unwrap();
    // A document whose text itself contains a request marker
    std::fs::write(
        dir.path().join("tricky.txt"),
        "Quoting the protocol: [REF: nested] appears here.",
    )
    .unwrap();
    let llm = Arc::new(MockProvider::constant("Generated with [REF: recursion] inside"));
    let resolver = KnowledgeResolver::new(full_chain(&dir), llm);

    for text in [
        "[REF: protocol]",
        "[REF: unknown topic] then [REF:",
        "[REF: a [REF: b] c [REF: d]",
        "unterminated [REF: protocol",
    ] {
        let out = resolver
            .rewrite_references(text, "Nova_Creative", DebatePhase::CommonGround)
            .await;
        assert!(!out.contains("[REF:"), "marker leaked in {:?}", out);

        // Second pass has nothing left to do
        let again = resolver
            .rewrite_references(&out, "Nova_Creative", DebatePhase::CommonGround)
            .await;
        assert_eq!(again, out);
    }
}

#[tokio::test]
async fn test_ledger_counts_only_resolved_markers() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("kb.txt"), "alpha beta gamma").unwrap();
    let resolver = KnowledgeResolver::new(
        KnowledgeConfig::local_only(dir.path()),
        Arc::new(MockProvider::smart()),
    );

    let text = "[REF: alpha] [REF: missing] [REF: beta] [REF: also missing] [REF: gamma]";
    let out = resolver
        .rewrite_references(text, "DrAda_Technical", DebatePhase::FinalPositions)
        .await;

    assert_eq!(out.matches("[Reference for").count(), 3);
    assert_eq!(out.matches("[No reference information found").count(), 2);
    assert_eq!(resolver.ledger().len().await, 3);
}
