//! Error types for the extraction pipeline

use kgweave_llm::LlmError;
use thiserror::Error;

/// Invalid configuration, reported before any chunk is processed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Chunk size must be positive
    #[error("Chunk size must be positive, got {0}")]
    InvalidChunkSize(usize),

    /// Overlap must be smaller than the chunk size
    #[error("Overlap ({overlap}) must be smaller than chunk size ({chunk_size})")]
    InvalidOverlap {
        /// Configured overlap
        overlap: usize,
        /// Configured chunk size
        chunk_size: usize,
    },

    /// JSON-LD mode needs an ontology
    #[error("Ontology path is required for JSON-LD extraction")]
    MissingOntology,

    /// LLM settings out of range or unusable
    #[error("Invalid LLM configuration: {0}")]
    InvalidLlm(String),

    /// Extraction settings out of range
    #[error("Invalid extraction configuration: {0}")]
    InvalidExtraction(String),

    /// Configuration text could not be parsed or written
    #[error("Configuration format error: {0}")]
    Format(String),

    /// Ontology file could not be loaded
    #[error("Failed to load ontology: {0}")]
    Ontology(String),
}

/// Failure of a single chunk; recorded, never fatal to the run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChunkError {
    /// LLM call, timeout or response decoding failed
    #[error("{0}")]
    Llm(String),

    /// Triple batch failed local validation
    #[error("Invalid triple data from chunk {0}")]
    InvalidTriples(usize),

    /// Response did not have the expected shape
    #[error("Unexpected data format in chunk {chunk}: {reason}")]
    UnexpectedFormat {
        /// Chunk number
        chunk: usize,
        /// What was wrong
        reason: String,
    },

    /// JSON-LD used terms outside the ontology
    #[error("JSON-LD validation failed for chunk {chunk}: {reason}")]
    Validation {
        /// Chunk number
        chunk: usize,
        /// Validator message
        reason: String,
    },

    /// JSON-LD could not be round-tripped through RDF
    #[error("JSON-LD normalization failed for chunk {chunk}: {reason}")]
    Normalization {
        /// Chunk number
        chunk: usize,
        /// Normalizer message
        reason: String,
    },
}

impl From<LlmError> for ChunkError {
    fn from(e: LlmError) -> Self {
        ChunkError::Llm(e.to_string())
    }
}

/// Failure while merging per-chunk results
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MergeError {
    /// RDF round-trip of the merged graph failed
    #[error("Processing error: {0}")]
    Normalization(String),

    /// Normalized document had no `@graph` array
    #[error("Processing error: merged JSON-LD has no @graph")]
    MissingGraph,
}

/// Run-level failure
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input produced no chunks (empty or whitespace-only text)
    #[error("No chunks were created from the input text")]
    NoChunks,

    /// Anything else that aborts the run
    #[error("Pipeline error: {0}")]
    Internal(String),
}
