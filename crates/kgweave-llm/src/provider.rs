//! Provider selection from configuration

use crate::{AnthropicProvider, LlmError, MockProvider, OllamaProvider, OpenAiProvider};
use kgweave_domain::{CompletionRequest, LlmProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI or an OpenAI-compatible server
    #[default]
    Openai,
    /// Anthropic messages API
    Anthropic,
    /// Local Ollama server
    Ollama,
}

impl ProviderKind {
    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Openai => "gpt-4-turbo",
            ProviderKind::Anthropic => "claude-3-5-sonnet-20241022",
            ProviderKind::Ollama => "llama3",
        }
    }

    /// Environment variable conventionally holding the API key
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Openai => Some("OPENAI_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Openai => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        };
        f.write_str(name)
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::Openai),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(format!("Unsupported LLM provider: {}", other)),
        }
    }
}

/// Everything needed to construct a network provider
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Backend
    pub kind: ProviderKind,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Output token budget
    pub max_tokens: u32,
    /// API key (OpenAI / Anthropic)
    pub api_key: Option<String>,
    /// Base URL override
    pub api_base: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Attempts per request
    pub max_retries: u32,
}

/// One of the concrete providers, chosen at runtime
pub enum AnyProvider {
    /// OpenAI-compatible
    OpenAi(OpenAiProvider),
    /// Anthropic
    Anthropic(AnthropicProvider),
    /// Ollama
    Ollama(OllamaProvider),
    /// Scripted mock
    Mock(MockProvider),
}

impl AnyProvider {
    /// Build the provider described by `settings`
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, LlmError> {
        let api_key = settings.api_key.clone().unwrap_or_default();

        let provider = match settings.kind {
            ProviderKind::Openai => {
                let mut provider = OpenAiProvider::new(api_key, settings.model.clone())?
                    .with_sampling(settings.temperature, settings.max_tokens)
                    .with_max_retries(settings.max_retries)
                    .with_timeout(settings.timeout_secs)?;
                if let Some(base) = &settings.api_base {
                    provider = provider.with_api_base(base.clone());
                }
                AnyProvider::OpenAi(provider)
            }
            ProviderKind::Anthropic => {
                let mut provider = AnthropicProvider::new(api_key, settings.model.clone())?
                    .with_sampling(settings.temperature, settings.max_tokens)
                    .with_max_retries(settings.max_retries)
                    .with_timeout(settings.timeout_secs)?;
                if let Some(base) = &settings.api_base {
                    provider = provider.with_api_base(base.clone());
                }
                AnyProvider::Anthropic(provider)
            }
            ProviderKind::Ollama => {
                let endpoint = settings
                    .api_base
                    .clone()
                    .unwrap_or_else(|| crate::ollama::DEFAULT_ENDPOINT.to_string());
                AnyProvider::Ollama(
                    OllamaProvider::new(endpoint, settings.model.clone())?
                        .with_sampling(settings.temperature, settings.max_tokens)
                        .with_max_retries(settings.max_retries)
                        .with_timeout(settings.timeout_secs)?,
                )
            }
        };

        Ok(provider)
    }
}

impl LlmProvider for AnyProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        match self {
            AnyProvider::OpenAi(p) => p.model_name(),
            AnyProvider::Anthropic(p) => p.model_name(),
            AnyProvider::Ollama(p) => p.model_name(),
            AnyProvider::Mock(p) => p.model_name(),
        }
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        match self {
            AnyProvider::OpenAi(p) => p.generate(request).await,
            AnyProvider::Anthropic(p) => p.generate(request).await,
            AnyProvider::Ollama(p) => p.generate(request).await,
            AnyProvider::Mock(p) => p.generate(request).await,
        }
    }
}
