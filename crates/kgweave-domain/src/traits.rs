//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction pipeline and
//! infrastructure. Implementations live in other crates (`kgweave-llm`,
//! `kgweave-ontology`).

use crate::OntologyInfo;
use serde_json::{Map, Value};
use std::fmt::Display;
use std::future::Future;

/// A single prompt exchange with an LLM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System prompt (role / rules)
    pub system_prompt: String,

    /// User prompt (task + text chunk)
    pub user_prompt: String,

    /// Ask the provider for JSON-only output where it supports that
    pub json_output: bool,
}

impl CompletionRequest {
    /// Create a request that expects JSON output
    pub fn json(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            json_output: true,
        }
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (kgweave-llm)
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: Display + Send;

    /// Name of the model used, for run metadata
    fn model_name(&self) -> &str;

    /// Generate a text completion
    fn generate(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Trait for ontology-backed JSON-LD handling
///
/// Implemented by the infrastructure layer (kgweave-ontology)
pub trait OntologyProvider: Send + Sync {
    /// Error type for validation and normalization
    type Error: Display + Send;

    /// Classes, properties and base IRI
    fn info(&self) -> &OntologyInfo;

    /// Authoritative JSON-LD context document: `{"@context": {...}}`
    fn context(&self) -> &Value;

    /// Raw ontology source text, included in prompts for grounding
    fn owl_content(&self) -> &str;

    /// Check that every term used in `data` resolves against the context
    fn validate_jsonld(&self, data: &Value) -> Result<(), Self::Error>;

    /// Round-trip `data` through an RDF graph and back to JSON-LD under the
    /// authoritative context
    fn normalize_jsonld(&self, data: &Value) -> Result<Value, Self::Error>;

    /// The term map inside the context document
    fn context_terms(&self) -> Map<String, Value> {
        self.context()
            .get("@context")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }
}
