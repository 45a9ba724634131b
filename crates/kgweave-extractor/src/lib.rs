//! kgweave Extractor
//!
//! Turns unstructured text into a deduplicated knowledge artifact: a list of
//! subject-predicate-object triples, or an ontology-conformant JSON-LD graph.
//!
//! # Architecture
//!
//! ```text
//! Text → Chunker → Extractor (one LLM call per chunk) → Merger → ExtractionResult
//! ```
//!
//! - **Chunker**: overlapping word windows
//! - **Extractors**: [`TripleExtractor`] and [`JsonLdExtractor`] behind the
//!   [`ChunkExtractor`] trait, selected once from [`ExtractionMode`]
//! - **Merger**: tuple deduplication for triples, RDF round-trip for JSON-LD
//! - **Pipeline**: sequencing, failure bookkeeping and statistics
//!
//! Per-chunk failures never abort a run; they are listed in
//! `ExtractionResult::failed_chunks`.
//!
//! # Example Usage
//!
//! ```no_run
//! use kgweave_extractor::{Pipeline, PipelineConfig};
//! use kgweave_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(
//!     r#"[{"subject": "marie curie", "predicate": "discovered", "object": "radium"}]"#,
//! );
//! let pipeline = Pipeline::new(&PipelineConfig::default(), llm)?;
//!
//! let result = pipeline.process_text("Marie Curie discovered radium.").await?;
//! println!("{} unique triples", result.triples().map_or(0, |t| t.len()));
//! println!("{} failed chunks", result.failed_chunks.len());
//! # Ok(())
//! # }
//! ```
//!
//! [`ExtractionMode`]: kgweave_domain::ExtractionMode

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
pub mod merger;
mod pdf;
mod pipeline;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use chunking::{split, Chunker};
pub use config::{ChunkingConfig, ExtractionConfig, LlmConfig, PipelineConfig};
pub use error::{ChunkError, ConfigError, MergeError, PipelineError};
pub use extractor::{ChunkExtractor, ChunkOutcome, JsonLdExtractor, TripleBatch, TripleExtractor};
pub use pdf::extract_pdf_text;
pub use pipeline::{ExtractorKind, Pipeline};
pub use prompt::PromptBuilder;
pub use types::{
    ExtractedData, ExtractionResult, FailedChunk, JsonLdStatistics, ProcessedResults, RunMetadata,
    Statistics, TripleStatistics,
};
