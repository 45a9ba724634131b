//! Configuration for the extraction pipeline

use crate::error::ConfigError;
use kgweave_domain::ExtractionMode;
use kgweave_llm::{ProviderKind, ProviderSettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// LLM backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend (`openai`, `anthropic` or `ollama`)
    pub provider: ProviderKind,

    /// Model name
    pub model_name: String,

    /// Sampling temperature, 0.0 to 2.0
    pub temperature: f32,

    /// Output token budget per call
    pub max_tokens: u32,

    /// API key; usually supplied through the environment instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override (OpenAI-compatible servers, Ollama endpoint)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Bound on each LLM call (seconds)
    pub timeout_secs: u64,

    /// Attempts per call on transient failures
    pub max_retries: u32,
}

impl LlmConfig {
    /// Defaults for `provider`, including its default model
    pub fn for_provider(provider: ProviderKind) -> Self {
        Self {
            provider,
            model_name: provider.default_model().to_string(),
            ..Self::default()
        }
    }

    /// Per-call timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Settings for constructing the provider
    pub fn to_settings(&self) -> ProviderSettings {
        ProviderSettings {
            kind: self.provider,
            model: self.model_name.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            api_key: self.api_key.clone(),
            api_base: self.api_base.clone(),
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.model_name.trim().is_empty() {
            return Err(ConfigError::InvalidLlm("model_name must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidLlm(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::InvalidLlm("max_tokens must be greater than 0".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidLlm("timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Openai,
            model_name: ProviderKind::Openai.default_model().to_string(),
            temperature: 0.0,
            max_tokens: 4096,
            api_key: None,
            api_base: None,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

/// Word-window chunking parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Words per chunk
    pub chunk_size: usize,

    /// Words shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    /// Check `chunk_size > 0` and `chunk_overlap < chunk_size`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidOverlap {
                overlap: self.chunk_overlap,
                chunk_size: self.chunk_size,
            });
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 100,
        }
    }
}

/// What to extract and how strictly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// `triples` or `jsonld`
    pub mode: ExtractionMode,

    /// OWL ontology, required in JSON-LD mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ontology_path: Option<PathBuf>,

    /// Check JSON-LD terms against the ontology
    pub enable_validation: bool,

    /// Round-trip JSON-LD through RDF per chunk
    pub enable_normalization: bool,

    /// Chunks extracted at once
    pub concurrency: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Triples,
            ontology_path: None,
            enable_validation: true,
            enable_normalization: true,
            concurrency: 1,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// LLM backend
    pub llm: LlmConfig,

    /// Chunking parameters
    pub chunking: ChunkingConfig,

    /// Extraction mode and toggles
    pub extraction: ExtractionConfig,
}

impl PipelineConfig {
    /// Validate every section; invalid combinations fail here, before any run
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunking.validate()?;
        self.llm.validate()?;

        if self.extraction.concurrency == 0 {
            return Err(ConfigError::InvalidExtraction(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.extraction.mode.requires_ontology() && self.extraction.ontology_path.is_none() {
            return Err(ConfigError::MissingOntology);
        }
        Ok(())
    }

    /// Small chunks processed four at a time
    pub fn fast() -> Self {
        Self {
            llm: LlmConfig {
                max_tokens: 2048,
                timeout_secs: 20,
                max_retries: 1,
                ..LlmConfig::default()
            },
            chunking: ChunkingConfig {
                chunk_size: 500,
                chunk_overlap: 50,
            },
            extraction: ExtractionConfig {
                concurrency: 4,
                ..ExtractionConfig::default()
            },
        }
    }

    /// Heavier overlap and patient retries for better recall
    pub fn thorough() -> Self {
        Self {
            llm: LlmConfig {
                timeout_secs: 120,
                max_retries: 5,
                ..LlmConfig::default()
            },
            chunking: ChunkingConfig {
                chunk_size: 1000,
                chunk_overlap: 200,
            },
            extraction: ExtractionConfig::default(),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str)
            .map_err(|e| ConfigError::Format(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Format(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(PipelineConfig::fast().validate().is_ok());
        assert!(PipelineConfig::thorough().validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size() {
        let mut config = PipelineConfig::default();
        config.chunking.chunk_size = 0;
        config.chunking.chunk_overlap = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidChunkSize(0)));
    }

    #[test]
    fn test_overlap_not_smaller_than_chunk_size() {
        let mut config = PipelineConfig::default();
        config.chunking.chunk_size = 100;
        config.chunking.chunk_overlap = 100;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidOverlap { .. })));
    }

    #[test]
    fn test_jsonld_requires_ontology() {
        let mut config = PipelineConfig::default();
        config.extraction.mode = ExtractionMode::JsonLd;
        assert_eq!(config.validate(), Err(ConfigError::MissingOntology));

        config.extraction.ontology_path = Some(PathBuf::from("science.owl"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_llm_settings() {
        let mut config = PipelineConfig::default();
        config.llm.temperature = 2.5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLlm(_))));

        let mut config = PipelineConfig::default();
        config.llm.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency() {
        let mut config = PipelineConfig::default();
        config.extraction.concurrency = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidExtraction(_))));
    }

    #[test]
    fn test_for_provider_picks_default_model() {
        let llm = LlmConfig::for_provider(ProviderKind::Anthropic);
        assert_eq!(llm.model_name, "claude-3-5-sonnet-20241022");
        assert_eq!(llm.to_settings().kind, ProviderKind::Anthropic);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = PipelineConfig::thorough();
        config.extraction.mode = ExtractionMode::JsonLd;
        config.extraction.ontology_path = Some(PathBuf::from("ontology/science.owl"));

        let toml_str = config.to_toml().unwrap();
        let parsed = PipelineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            [chunking]
            chunk_size = 300

            [extraction]
            mode = "jsonld"
            ontology_path = "science.owl"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 300);
        assert_eq!(config.chunking.chunk_overlap, 100);
        assert_eq!(config.extraction.mode, ExtractionMode::JsonLd);
        assert!(config.extraction.enable_validation);
        assert_eq!(config.llm.model_name, "gpt-4-turbo");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            PipelineConfig::from_toml("[chunking\nchunk_size = "),
            Err(ConfigError::Format(_))
        ));
    }
}
