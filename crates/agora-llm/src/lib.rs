//! # Agora LLM
//!
//! Chat-completion providers used by the debate engine.
//!
//! ## Supported Backends
//!
//! | Provider | Type | Key Required |
//! |----------|------|--------------|
//! | OpenAI | API | `OPENAI_API_KEY` |
//! | Ollama | Local | None |
//! | Mock | Testing | None |
//!
//! ## Quick Start
//!
//! ```rust
//! use agora_llm::{LlmProvider, MockProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Use mock provider for testing
//!     let llm = MockProvider::smart();
//!
//!     let response = llm.ask("What is structured debate?").await.unwrap();
//!     println!("{}", response);
//! }
//! ```
//!
//! ## With OpenAI
//!
//! ```rust,ignore
//! use agora_llm::{LlmCircuitConfig, OpenAIProvider, ResilientProvider};
//!
//! let api_key = std::env::var("OPENAI_API_KEY").unwrap();
//! let llm = ResilientProvider::new(OpenAIProvider::gpt4o(&api_key), LlmCircuitConfig::default());
//!
//! let response = llm.ask("Summarize the trade-offs of remote work").await.unwrap();
//! ```

pub mod config;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod provider;
pub mod resilient_provider;

pub use config::{ConfigError, LlmConfig};
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use provider::{ChatMessage, ChatRole, LlmError, LlmProvider, LlmRequest, LlmResponse};
pub use resilient_provider::{CircuitState, LlmCircuitConfig, ProviderStats, ResilientProvider};
