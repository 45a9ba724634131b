//! Structured-output LLM client used by the extractors

use crate::parser::{coerce_triples, decode_json, TripleCandidates};
use crate::LlmError;
use kgweave_domain::{CompletionRequest, ExtractionMode, LlmProvider};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Decoded reply for one chunk
#[derive(Debug, Clone, PartialEq)]
pub enum LlmPayload {
    /// Triple candidates (triples mode)
    Triples(TripleCandidates),
    /// Decoded JSON value (JSON-LD mode); shape checks are the extractor's job
    JsonLd(Value),
}

/// Sends one formatted prompt per chunk and returns parsed JSON.
///
/// Every call is bounded by `timeout`; an expired call is reported as
/// `LlmError::Timeout`, never as a hang.
pub struct ExtractionClient<P> {
    provider: P,
    mode: ExtractionMode,
    system_prompt: String,
    timeout: Duration,
}

impl<P: LlmProvider> ExtractionClient<P> {
    /// Create a client for `mode` with a fixed system prompt
    pub fn new(provider: P, mode: ExtractionMode, system_prompt: impl Into<String>) -> Self {
        Self {
            provider,
            mode,
            system_prompt: system_prompt.into(),
            timeout: Duration::from_secs(crate::ollama::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The system prompt sent with every call
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Name of the underlying model
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Run one extraction call for `chunk_number`
    pub async fn extract(&self, user_prompt: &str, chunk_number: usize) -> Result<LlmPayload, LlmError> {
        let request = CompletionRequest::json(self.system_prompt.clone(), user_prompt);

        let raw = timeout(self.timeout, self.provider.generate(&request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| LlmError::Provider(e.to_string()))?;

        debug!("LLM response for chunk {}: {} chars", chunk_number, raw.len());

        let value = decode_json(&raw)?;
        match self.mode {
            ExtractionMode::Triples => coerce_triples(value, chunk_number).map(LlmPayload::Triples),
            ExtractionMode::JsonLd => Ok(LlmPayload::JsonLd(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;

    #[tokio::test]
    async fn test_extract_triples_payload() {
        let provider = MockProvider::new(r#"[{"subject":"a","predicate":"b","object":"c"}]"#);
        let client = ExtractionClient::new(provider.clone(), ExtractionMode::Triples, "sys");

        let payload = client.extract("prompt", 4).await.unwrap();
        match payload {
            LlmPayload::Triples(c) => assert_eq!(c.triples[0].chunk, 4),
            other => panic!("unexpected payload {:?}", other),
        }
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_extract_jsonld_payload_is_raw_value() {
        let provider = MockProvider::new(r#""{\"@graph\": []}""#);
        let client = ExtractionClient::new(provider, ExtractionMode::JsonLd, "sys");

        let payload = client.extract("prompt", 1).await.unwrap();
        assert!(matches!(payload, LlmPayload::JsonLd(Value::String(_))));
    }

    #[tokio::test]
    async fn test_provider_error_is_reported() {
        let mut provider = MockProvider::new("[]");
        provider.add_error("boom");
        let client = ExtractionClient::new(provider, ExtractionMode::Triples, "sys");

        let result = client.extract("boom", 1).await;
        assert!(matches!(result, Err(LlmError::Provider(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let provider = MockProvider::new("[]").with_delay(Duration::from_millis(200));
        let client = ExtractionClient::new(provider, ExtractionMode::Triples, "sys")
            .with_timeout(Duration::from_millis(10));

        let result = client.extract("slow", 1).await;
        assert!(matches!(result, Err(LlmError::Timeout(_))));
    }
}
