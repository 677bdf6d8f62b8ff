//! Run command - Hold a debate and save its artifacts
//!
//! Usage:
//! ```bash
//! agora run --problem "Should cities ban cars downtown?" --agents business,critical
//! agora run --provider mock --use-knowledge --document-dir ./documents
//! agora run --interactive
//! ```

use agora_debate::{ArtifactWriter, DebateConfig, DebateOrchestrator, PersonaAgent};
use agora_knowledge::{GoogleSearch, KnowledgeConfig, KnowledgeResolver};
use agora_llm::{
    LlmCircuitConfig, LlmConfig, LlmProvider, MockProvider, OllamaProvider, OpenAIProvider,
    ResilientProvider,
};
use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::interactive::Prompter;
use crate::settings::Settings;
use crate::{print_error, print_info, print_success, print_warning};

/// Provider stack used by the CLI: any backend behind the circuit breaker
pub type CliProvider = ResilientProvider<Arc<dyn LlmProvider>>;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Problem statement to debate
    #[arg(short, long)]
    pub problem: Option<String>,

    /// Comma-separated built-in agents (business, creative, critical, technical)
    #[arg(short, long, value_delimiter = ',')]
    pub agents: Option<Vec<String>>,

    /// LLM provider (openai, ollama, mock)
    #[arg(long)]
    pub provider: Option<String>,

    /// Model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output directory (default: output_<timestamp>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Resolve [REF: ...] markers against documents, web and AI
    #[arg(long)]
    pub use_knowledge: bool,

    /// Directory of .txt, .pdf and .docx reference documents
    #[arg(long)]
    pub document_dir: Option<PathBuf>,

    /// Skip the web search source
    #[arg(long)]
    pub no_web_search: bool,

    /// Skip AI-generated knowledge
    #[arg(long)]
    pub no_ai_generation: bool,

    /// Skip sentiment scoring in the analysis
    #[arg(long)]
    pub no_sentiment: bool,

    /// Choose the topic and create agents interactively
    #[arg(short, long)]
    pub interactive: bool,
}

impl RunArgs {
    /// Command-line flags win over every other settings layer.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(problem) = &self.problem {
            settings.problem = problem.clone();
        }
        if let Some(agents) = &self.agents {
            settings.agents = agents.iter().map(|a| a.trim().to_lowercase()).collect();
        }
        if let Some(provider) = &self.provider {
            settings.provider = provider.to_lowercase();
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(output) = &self.output {
            settings.output_dir = Some(output.clone());
        }
        if let Some(dir) = &self.document_dir {
            settings.document_dir = dir.clone();
        }
        settings.use_knowledge |= self.use_knowledge;
        settings.interactive |= self.interactive;
        if self.no_web_search {
            settings.web_search = false;
        }
        if self.no_ai_generation {
            settings.ai_generation = false;
        }
        if self.no_sentiment {
            settings.score_sentiment = false;
        }
    }
}

/// Run the run command
pub async fn run(args: RunArgs, config_file: &Path) -> Result<()> {
    let mut settings = Settings::load(config_file)?;
    args.apply(&mut settings);
    settings.validate()?;

    let (problem, agents) = if settings.interactive {
        println!("\n{}", "=== Interactive Agent Creation ===".bold().cyan());
        let stdin = io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), io::stdout());
        let problem = prompter.topic(&settings.problem)?;
        (problem, prompter.agents()?)
    } else {
        let agents = PersonaAgent::from_keys(&settings.agents).with_context(|| {
            "Available agent types: business, creative, critical, technical".to_string()
        })?;
        (settings.problem.clone(), agents)
    };
    DebateOrchestrator::<CliProvider>::validate(&problem, &agents)?;

    let llm = Arc::new(build_provider(&settings, &LlmConfig::from_env())?);
    let mut orchestrator = DebateOrchestrator::new(
        llm.clone(),
        DebateConfig {
            knowledge_enabled: settings.use_knowledge,
            score_sentiment: settings.score_sentiment,
            ..DebateConfig::default()
        },
    );
    if settings.use_knowledge {
        orchestrator = orchestrator.with_knowledge(Arc::new(build_resolver(&settings, llm)?));
    }

    print_banner(&settings, &problem, &agents);

    let started = Instant::now();
    let outcome = orchestrator.run(&problem, agents).await?;

    let output_dir = settings.resolve_output_dir();
    let writer = ArtifactWriter::new(&output_dir);
    let report = writer
        .write_all(&outcome)
        .await
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    println!();
    println!("{}", "Debate complete".bold().green());
    println!("{}", "═".repeat(50).cyan());
    print_success(&format!("Results saved to {}", output_dir.display()));
    for path in &report.written {
        println!("  {} {}", "•".cyan(), path.display());
    }
    for (path, error) in &report.failed {
        print_error(&format!("{}: {}", path.display(), error));
    }
    if settings.use_knowledge {
        print_info(&format!(
            "{} knowledge references resolved",
            outcome.transcript.knowledge_ledger().len()
        ));
    }
    print_info(&format!(
        "Total runtime: {:.2}s",
        started.elapsed().as_secs_f64()
    ));

    Ok(())
}

/// Build the configured backend. A missing credential is fatal.
pub fn build_provider(settings: &Settings, llm_config: &LlmConfig) -> Result<CliProvider> {
    let inner: Arc<dyn LlmProvider> = match settings.provider.to_lowercase().as_str() {
        "openai" => {
            let key = llm_config
                .require_api_key("openai")
                .context("The openai provider needs an API key")?;
            Arc::new(OpenAIProvider::new(key, &settings.model))
        }
        "ollama" => Arc::new(OllamaProvider::with_url(
            &llm_config.ollama_url,
            &settings.model,
        )),
        "mock" => Arc::new(MockProvider::smart()),
        other => bail!("Unknown provider '{}'", other),
    };
    tracing::info!(provider = inner.name(), model = %settings.model, "LLM provider ready");
    Ok(ResilientProvider::new(inner, LlmCircuitConfig::default()))
}

fn build_resolver(
    settings: &Settings,
    llm: Arc<CliProvider>,
) -> Result<KnowledgeResolver<CliProvider>> {
    std::fs::create_dir_all(&settings.document_dir).with_context(|| {
        format!(
            "Failed to create document directory {}",
            settings.document_dir.display()
        )
    })?;

    let config = KnowledgeConfig {
        use_web_search: settings.web_search,
        use_ai_generation: settings.ai_generation,
        ..KnowledgeConfig::with_document_dir(&settings.document_dir)
    };
    let mut resolver = KnowledgeResolver::new(config, llm);

    if settings.web_search {
        match GoogleSearch::from_env() {
            Some(search) => resolver = resolver.with_web_search(Arc::new(search)),
            None => print_warning(
                "GOOGLE_API_KEY or GOOGLE_CX not set; the web search source will find nothing",
            ),
        }
    }
    Ok(resolver)
}

fn print_banner(settings: &Settings, problem: &str, agents: &[PersonaAgent]) {
    println!();
    println!("{}", "Agora - Multi-Agent Debate".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!("  {} {}", "Problem:".dimmed(), problem);
    println!(
        "  {} {} / {}",
        "Model:".dimmed(),
        settings.provider.green(),
        settings.model.green()
    );
    println!("  {}", "Agents:".dimmed());
    for agent in agents {
        println!("    {} {} ({})", "•".cyan(), agent.name().green(), agent.role());
    }
    if settings.use_knowledge {
        let on_off = |enabled: bool| if enabled { "enabled" } else { "disabled" };
        println!(
            "  {} documents from {}, web search {}, AI generation {}",
            "Knowledge:".dimmed(),
            settings.document_dir.display(),
            on_off(settings.web_search),
            on_off(settings.ai_generation)
        );
    } else {
        println!("  {} disabled", "Knowledge:".dimmed());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let mut settings = Settings::default();
        let args = RunArgs {
            problem: Some("Is nuclear power green?".to_string()),
            agents: Some(vec![" Critical".to_string(), "technical ".to_string()]),
            provider: Some("Mock".to_string()),
            use_knowledge: true,
            no_web_search: true,
            ..RunArgs::default()
        };
        args.apply(&mut settings);

        assert_eq!(settings.problem, "Is nuclear power green?");
        assert_eq!(settings.agents, vec!["critical", "technical"]);
        assert_eq!(settings.provider, "mock");
        assert!(settings.use_knowledge);
        assert!(!settings.web_search);
        assert!(settings.ai_generation);
    }

    #[test]
    fn test_absent_flags_keep_settings() {
        let mut settings = Settings {
            web_search: false,
            model: "llama3".to_string(),
            ..Settings::default()
        };
        RunArgs::default().apply(&mut settings);
        assert!(!settings.web_search);
        assert_eq!(settings.model, "llama3");
    }

    #[test]
    fn test_openai_without_key_is_fatal() {
        let settings = Settings::default();
        let err = build_provider(&settings, &LlmConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_mock_provider_needs_no_credentials() {
        let settings = Settings {
            provider: "mock".to_string(),
            ..Settings::default()
        };
        let provider = build_provider(&settings, &LlmConfig::default()).unwrap();
        assert_eq!(provider.name(), "smart-mock");
    }
}
