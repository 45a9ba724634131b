//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline configuration rejected
    #[error("Invalid pipeline configuration: {0}")]
    Pipeline(#[from] kgweave_extractor::ConfigError),

    /// Run aborted
    #[error("Extraction failed: {0}")]
    Extraction(#[from] kgweave_extractor::PipelineError),

    /// LLM provider could not be built
    #[error("LLM error: {0}")]
    Llm(#[from] kgweave_llm::LlmError),

    /// Upload failed
    #[error("Store error: {0}")]
    Store(#[from] kgweave_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
