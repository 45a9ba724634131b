//! Anthropic messages API provider

use crate::http::{build_client, send_json};
use crate::LlmError;
use kgweave_domain::{CompletionRequest, LlmProvider};
use serde::{Deserialize, Serialize};

/// Default Anthropic API base URL
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

/// API version header value
pub const API_VERSION: &str = "2023-06-01";

/// Anthropic messages provider
pub struct AnthropicProvider {
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_secs: u64,
    max_retries: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    /// Create a provider for `model` authenticated with `api_key`
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "Anthropic API key is missing (set ANTHROPIC_API_KEY)".to_string(),
            ));
        }

        Ok(Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key,
            model: model.into(),
            temperature: 0.0,
            max_tokens: 4096,
            timeout_secs: crate::ollama::DEFAULT_TIMEOUT_SECS,
            max_retries: crate::ollama::DEFAULT_MAX_RETRIES,
            client: build_client(crate::ollama::DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// Use a different API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set sampling temperature and output token budget
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Result<Self, LlmError> {
        self.client = build_client(timeout_secs)?;
        self.timeout_secs = timeout_secs;
        Ok(self)
    }

    /// Set the maximum number of attempts per request
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl LlmProvider for AnthropicProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.api_base);

        let response: MessagesResponse = send_json(
            || {
                self.client
                    .post(&url)
                    .header("x-api-key", self.api_key.as_str())
                    .header("anthropic-version", API_VERSION)
                    .json(&MessagesRequest {
                        model: &self.model,
                        max_tokens: self.max_tokens,
                        temperature: self.temperature,
                        system: &request.system_prompt,
                        messages: [UserMessage {
                            role: "user",
                            content: &request.user_prompt,
                        }],
                    })
            },
            &self.model,
            self.timeout_secs,
            self.max_retries,
        )
        .await?;

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse("Empty response from LLM".to_string()));
        }
        Ok(text.trim().to_string())
    }
}
