//! Provider configuration read from the environment

use serde::{Deserialize, Serialize};
use std::env;

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI API key (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,
    /// Ollama base URL (default: http://localhost:11434)
    pub ollama_url: String,
    /// Default provider (env: AGORA_PROVIDER)
    pub default_provider: String,
    /// Default model (env: AGORA_MODEL)
    pub default_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            ollama_url: "http://localhost:11434".to_string(),
            default_provider: "openai".to_string(),
            default_model: "gpt-4o".to_string(),
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            ollama_url: env::var("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            default_provider: env::var("AGORA_PROVIDER").unwrap_or(defaults.default_provider),
            default_model: env::var("AGORA_MODEL").unwrap_or(defaults.default_model),
        }
    }

    /// Get API key for a provider
    pub fn api_key(&self, provider: &str) -> Option<&str> {
        match provider.to_lowercase().as_str() {
            "openai" => self.openai_api_key.as_deref(),
            _ => None,
        }
    }

    /// API key for a provider, or the error naming the missing variable
    pub fn require_api_key(&self, provider: &str) -> Result<&str, ConfigError> {
        match provider.to_lowercase().as_str() {
            "openai" => self
                .api_key("openai")
                .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string())),
            other => Err(ConfigError::Invalid(format!(
                "provider '{}' does not use an API key",
                other
            ))),
        }
    }

    /// Check if a provider is configured
    pub fn is_configured(&self, provider: &str) -> bool {
        match provider.to_lowercase().as_str() {
            "openai" => self.openai_api_key.is_some(),
            "ollama" | "mock" => true, // Always available
            _ => false,
        }
    }

    /// List available providers
    pub fn available_providers(&self) -> Vec<&str> {
        let mut providers = vec!["mock", "ollama"];
        if self.openai_api_key.is_some() {
            providers.push("openai");
        }
        providers
    }
}
