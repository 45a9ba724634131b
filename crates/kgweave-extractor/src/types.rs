//! Result types produced by a pipeline run

use kgweave_domain::{ExtractionMode, NormalizedTriple};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Terminal failure record for one chunk.
///
/// `chunk_number` is absent for the synthetic entry that records a merge failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedChunk {
    /// Chunk that failed, if the failure belongs to one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_number: Option<usize>,

    /// Human-readable diagnostic
    pub error: String,
}

impl FailedChunk {
    /// Failure of chunk `chunk_number`
    pub fn new(chunk_number: usize, error: impl Into<String>) -> Self {
        Self {
            chunk_number: Some(chunk_number),
            error: error.into(),
        }
    }

    /// Failure not tied to a chunk (merge stage)
    pub fn merge(error: impl Into<String>) -> Self {
        Self {
            chunk_number: None,
            error: error.into(),
        }
    }
}

/// Counters for a triples run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleStatistics {
    /// Chunks attempted
    pub total_chunks: usize,
    /// Chunks that produced data
    pub processed_chunks: usize,
    /// Chunks recorded in `failed_chunks`
    pub failed_chunks: usize,
    /// Valid normalized triples before deduplication
    pub total_triples: usize,
    /// Triples after deduplication
    pub unique_triples: usize,
    /// `total_triples - unique_triples`
    pub duplicates_removed: usize,
    /// Malformed items dropped while parsing LLM output
    #[serde(default)]
    pub discarded_candidates: usize,
    /// Triples dropped because a field was empty after normalization
    #[serde(default)]
    pub invalid_triples: usize,
}

/// Counters for a JSON-LD run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonLdStatistics {
    /// Chunks attempted
    pub total_chunks: usize,
    /// Chunks that produced data
    pub processed_chunks: usize,
    /// Chunks recorded in `failed_chunks`
    pub failed_chunks: usize,
    /// Entities in the merged graph
    pub total_entities: usize,
    /// Entities across all chunk graphs before merging
    pub original_entities: usize,
    /// `original_entities - total_entities`, never negative
    pub duplicates_removed: usize,
}

/// Statistics for either mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Statistics {
    /// Triples mode
    Triples(TripleStatistics),
    /// JSON-LD mode
    JsonLd(JsonLdStatistics),
}

impl Statistics {
    /// Chunks attempted
    pub fn total_chunks(&self) -> usize {
        match self {
            Statistics::Triples(s) => s.total_chunks,
            Statistics::JsonLd(s) => s.total_chunks,
        }
    }

    /// Chunks recorded as failed
    pub fn failed_chunks(&self) -> usize {
        match self {
            Statistics::Triples(s) => s.failed_chunks,
            Statistics::JsonLd(s) => s.failed_chunks,
        }
    }

    /// Duplicates removed by the merge
    pub fn duplicates_removed(&self) -> usize {
        match self {
            Statistics::Triples(s) => s.duplicates_removed,
            Statistics::JsonLd(s) => s.duplicates_removed,
        }
    }
}

/// The merged artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractedData {
    /// Deduplicated triples
    Triples(Vec<NormalizedTriple>),
    /// `{"@context", "@graph"}` document
    Jsonld(Value),
}

/// Run metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Unique, time-ordered run id
    pub run_id: Uuid,
    /// Extraction mode
    pub mode: ExtractionMode,
    /// Model that produced the data
    pub model_name: String,
    /// Wall-clock duration of the run
    pub processing_time_ms: u64,
}

/// What an extractor hands back after merging
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedResults {
    /// Merged artifact
    pub data: ExtractedData,
    /// Counters
    pub statistics: Statistics,
    /// Chunk failures plus any merge failure
    pub failed_chunks: Vec<FailedChunk>,
}

/// Final output of one pipeline run.
///
/// Serializes as `{"triples": [...], ...}` or `{"jsonld": {...}, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Merged artifact
    #[serde(flatten)]
    pub data: ExtractedData,

    /// Counters
    pub statistics: Statistics,

    /// Every chunk that produced no data, plus any merge failure
    pub failed_chunks: Vec<FailedChunk>,

    /// Run metadata
    pub metadata: RunMetadata,
}

impl ExtractionResult {
    pub(crate) fn new(processed: ProcessedResults, metadata: RunMetadata) -> Self {
        Self {
            data: processed.data,
            statistics: processed.statistics,
            failed_chunks: processed.failed_chunks,
            metadata,
        }
    }

    /// Triples, in triples mode
    pub fn triples(&self) -> Option<&[NormalizedTriple]> {
        match &self.data {
            ExtractedData::Triples(triples) => Some(triples),
            ExtractedData::Jsonld(_) => None,
        }
    }

    /// JSON-LD document, in JSON-LD mode
    pub fn jsonld(&self) -> Option<&Value> {
        match &self.data {
            ExtractedData::Jsonld(doc) => Some(doc),
            ExtractedData::Triples(_) => None,
        }
    }

    /// Pretty-printed JSON document
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
