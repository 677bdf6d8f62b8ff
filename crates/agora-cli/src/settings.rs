//! Layered run settings
//!
//! Built-in defaults, then an optional `agora.toml`, then `AGORA_*`
//! environment variables. Command-line flags are applied last by the
//! `run` command.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "agora.toml";
pub const DEFAULT_PROBLEM: &str =
    "How can we make AI-generated content more reliable for professional use?";

/// Providers the CLI knows how to build
pub const PROVIDERS: [&str; 3] = ["openai", "ollama", "mock"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub problem: String,
    /// Built-in persona keys
    pub agents: Vec<String>,
    pub provider: String,
    pub model: String,
    /// `None` picks a timestamped directory at run time
    pub output_dir: Option<PathBuf>,
    pub use_knowledge: bool,
    pub document_dir: PathBuf,
    pub web_search: bool,
    pub ai_generation: bool,
    pub interactive: bool,
    pub score_sentiment: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            problem: DEFAULT_PROBLEM.to_string(),
            agents: vec!["business".to_string(), "creative".to_string()],
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            output_dir: None,
            use_knowledge: false,
            document_dir: PathBuf::from("documents"),
            web_search: true,
            ai_generation: true,
            interactive: false,
            score_sentiment: true,
        }
    }
}

impl Settings {
    /// Load defaults, the optional config file and `AGORA_*` variables.
    pub fn load(config_file: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(config_file).required(false))
            .add_source(
                Environment::with_prefix("AGORA")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("agents"),
            )
            .build()
            .with_context(|| format!("Failed to read settings from {}", config_file.display()))?
            .try_deserialize::<Settings>()
            .context("Invalid settings")?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let provider = self.provider.to_lowercase();
        if !PROVIDERS.contains(&provider.as_str()) {
            anyhow::bail!(
                "Unknown provider '{}' (expected one of: {})",
                self.provider,
                PROVIDERS.join(", ")
            );
        }
        if self.model.trim().is_empty() {
            anyhow::bail!("Model identifier must not be empty");
        }
        Ok(())
    }

    /// Output directory for this run, timestamped when not configured
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "output_{}",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(settings.agents, vec!["business", "creative"]);
        assert_eq!(settings.document_dir, PathBuf::from("documents"));
        assert!(settings.web_search);
        assert!(!settings.use_knowledge);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agora.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "problem = \"Should cities ban cars downtown?\"\n\
             agents = [\"critical\", \"technical\"]\n\
             provider = \"mock\"\n\
             use_knowledge = true\n\
             web_search = false"
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.problem, "Should cities ban cars downtown?");
        assert_eq!(settings.agents, vec!["critical", "technical"]);
        assert_eq!(settings.provider, "mock");
        assert!(settings.use_knowledge);
        assert!(!settings.web_search);
        assert!(settings.ai_generation);
        assert_eq!(settings.model, "gpt-4o");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let settings = Settings {
            provider: "palm".to_string(),
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("palm"));
    }

    #[test]
    fn test_output_dir_timestamped_by_default() {
        let settings = Settings::default();
        let dir = settings.resolve_output_dir();
        assert!(dir.to_string_lossy().starts_with("output_"));

        let fixed = Settings {
            output_dir: Some(PathBuf::from("runs/today")),
            ..Settings::default()
        };
        assert_eq!(fixed.resolve_output_dir(), PathBuf::from("runs/today"));
    }
}
