//! kgweave LLM Provider Layer
//!
//! Pluggable LLM provider implementations of the `LlmProvider` trait from
//! `kgweave-domain`, plus the structured-output client the extractors talk to.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `OpenAiProvider`: OpenAI-compatible chat completions
//! - `AnthropicProvider`: Anthropic messages API
//! - `AnyProvider`: one of the above, selected from configuration
//!
//! # Structured output
//!
//! [`ExtractionClient`] sends one prompt per chunk, decodes the JSON reply and
//! coerces it into triple candidates or a JSON-LD payload. It never retries on
//! its own; transport-level retries belong to the HTTP providers.
//!
//! # Examples
//!
//! ```
//! use kgweave_llm::MockProvider;
//! use kgweave_domain::{CompletionRequest, LlmProvider};
//!
//! # tokio_test_block_on(async {
//! let provider = MockProvider::new("[]");
//! let request = CompletionRequest::json("system", "user");
//! let result = provider.generate(&request).await.unwrap();
//! assert_eq!(result, "[]");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod anthropic;
pub mod client;
mod http;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod parser;
pub mod provider;

use thiserror::Error;

pub use anthropic::AnthropicProvider;
pub use client::{ExtractionClient, LlmPayload};
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use parser::TripleCandidates;
pub use provider::{AnyProvider, ProviderKind, ProviderSettings};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Request did not complete in time
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Provider cannot be constructed from the given settings
    #[error("Provider configuration error: {0}")]
    Configuration(String),

    /// Error reported by a provider implementation
    #[error("Provider error: {0}")]
    Provider(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}
