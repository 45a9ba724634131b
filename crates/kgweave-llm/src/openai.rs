//! OpenAI-compatible chat completions provider
//!
//! Works against api.openai.com or any server exposing the same
//! `/chat/completions` endpoint (set `api_base`).

use crate::http::{build_client, send_json};
use crate::LlmError;
use kgweave_domain::{CompletionRequest, LlmProvider};
use serde::{Deserialize, Serialize};

/// Default OpenAI API base URL
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI chat completions provider
pub struct OpenAiProvider {
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
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider for `model` authenticated with `api_key`
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "OpenAI API key is missing (set OPENAI_API_KEY)".to_string(),
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

    /// Point the provider at a different OpenAI-compatible server
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

impl LlmProvider for OpenAiProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.api_base);

        let response: ChatResponse = send_json(
            || {
                self.client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&ChatRequest {
                        model: &self.model,
                        messages: [
                            ChatMessage {
                                role: "system",
                                content: &request.system_prompt,
                            },
                            ChatMessage {
                                role: "user",
                                content: &request.user_prompt,
                            },
                        ],
                        temperature: self.temperature,
                        max_tokens: self.max_tokens,
                    })
            },
            &self.model,
            self.timeout_secs,
            self.max_retries,
        )
        .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no choices".to_string()))
    }
}
