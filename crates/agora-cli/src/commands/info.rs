//! Info command - Show providers and knowledge sources
//!
//! Usage:
//! ```bash
//! agora info
//! ```

use agora_knowledge::{DocumentStore, SUPPORTED_EXTENSIONS};
use agora_llm::LlmConfig;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

use crate::settings::Settings;

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs;

/// Run the info command
pub fn run(_args: InfoArgs, config_file: &Path) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let settings = Settings::load(config_file)?;
    let llm_config = LlmConfig::from_env();

    println!("{}", "Agora - Multi-Agent Debate".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!();

    println!("{}", "Version Information:".bold());
    println!("  {} {}", "CLI Version:".dimmed(), version.green());
    println!();

    println!("{}", "LLM Providers:".bold());
    for provider in ["openai", "ollama", "mock"] {
        let mark = if llm_config.is_configured(provider) {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {} {}", mark, provider);
    }
    println!(
        "  {} {} / {}",
        "Selected:".dimmed(),
        settings.provider.green(),
        settings.model.green()
    );
    println!("  {} {}", "Ollama URL:".dimmed(), llm_config.ollama_url);
    println!();

    println!("{}", "Knowledge Sources:".bold());
    let documents = DocumentStore::new(&settings.document_dir).check_directory();
    println!(
        "  {} {} ({} supported files: {})",
        "Documents:".dimmed(),
        settings.document_dir.display(),
        documents,
        SUPPORTED_EXTENSIONS.join(", ")
    );
    let google = std::env::var("GOOGLE_API_KEY").is_ok() && std::env::var("GOOGLE_CX").is_ok();
    println!(
        "  {} {}",
        "Web search:".dimmed(),
        if google {
            "Google Custom Search".green()
        } else {
            "not configured (GOOGLE_API_KEY, GOOGLE_CX)".yellow()
        }
    );
    println!(
        "  {} {}",
        "AI generation:".dimmed(),
        if settings.ai_generation {
            "enabled".green()
        } else {
            "disabled".yellow()
        }
    );
    println!();

    println!("{}", "Configuration:".bold());
    println!(
        "  {} {}",
        "Settings file:".dimmed(),
        config_file.display()
    );
    println!(
        "  {} AGORA_* variables and .env override the settings file",
        "ℹ".blue()
    );
    println!();

    Ok(())
}
