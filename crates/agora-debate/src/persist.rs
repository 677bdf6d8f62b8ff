//! Writes a finished debate to its output directory.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::analytics::EvolutionAnalysis;
use crate::error::PersistError;
use crate::orchestrator::DebateOutcome;
use crate::transcript::DebateTranscript;

pub const SUMMARY_FILE: &str = "debate_summary.md";
pub const EVOLUTION_FILE: &str = "idea_evolution.md";
pub const FLOW_FILE: &str = "debate_flow.md";
pub const NETWORK_FILE: &str = "visualizations/influence_network.txt";
pub const REFERENCES_FILE: &str = "knowledge_references.md";
pub const DATA_FILE: &str = "debate_data.json";

/// Machine-readable dump: the full transcript plus derived artifacts
#[derive(Serialize)]
struct RunRecord<'a> {
    #[serde(flatten)]
    transcript: &'a DebateTranscript,
    idea_evolution: &'a str,
    mermaid_diagram: &'a str,
    analysis: &'a EvolutionAnalysis,
}

/// Artifact paths written and the ones that failed.
#[derive(Debug, Default)]
pub struct PersistReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl PersistReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every artifact of `outcome`.
    ///
    /// Only a missing output directory is an error. A failed file is logged
    /// and listed in the report; the remaining files are still written.
    pub async fn write_all(&self, outcome: &DebateOutcome) -> Result<PersistReport, PersistError> {
        fs::create_dir_all(&self.output_dir).await?;
        let mut report = PersistReport::default();

        let summary = format!("# Debate Summary\n\n{}", outcome.transcript.final_report());
        self.write(&mut report, SUMMARY_FILE, summary).await;
        self.write(&mut report, EVOLUTION_FILE, outcome.idea_evolution.clone())
            .await;

        let flow = format!(
            "# Debate Flow Diagram\n\n```mermaid\n{}\n```",
            outcome.flow_diagram
        );
        self.write(&mut report, FLOW_FILE, flow).await;
        self.write(&mut report, NETWORK_FILE, outcome.influence_network.clone())
            .await;

        if let Some(references) = &outcome.references {
            self.write(&mut report, REFERENCES_FILE, references.clone())
                .await;
        }

        let record = RunRecord {
            transcript: &outcome.transcript,
            idea_evolution: &outcome.idea_evolution,
            mermaid_diagram: &outcome.flow_diagram,
            analysis: &outcome.analysis,
        };
        match serde_json::to_string_pretty(&record) {
            Ok(json) => self.write(&mut report, DATA_FILE, json).await,
            Err(e) => {
                warn!(error = %e, "Could not serialize debate data");
                report
                    .failed
                    .push((self.output_dir.join(DATA_FILE), e.to_string()));
            }
        }

        info!(
            dir = %self.output_dir.display(),
            written = report.written.len(),
            failed = report.failed.len(),
            "Artifacts saved"
        );
        Ok(report)
    }

    async fn write(&self, report: &mut PersistReport, name: &str, contents: String) {
        let path = self.output_dir.join(name);
        match write_file(&path, contents).await {
            Ok(()) => report.written.push(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not write artifact");
                report.failed.push((path, e.to_string()));
            }
        }
    }
}

async fn write_file(path: &Path, contents: String) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, contents).await?;
    Ok(())
}

/// Load a transcript back from a `debate_data.json` dump.
pub async fn load_transcript(path: &Path) -> Result<DebateTranscript, PersistError> {
    let json = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&json)?)
}
