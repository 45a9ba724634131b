//! Pipeline orchestrator: chunk, extract, merge
//!
//! A run moves through `Chunking → PerChunkExtraction → Merging`. Only two
//! things abort it: input that yields no chunks, and input that cannot be read
//! at all (PDF). Per-chunk failures are collected in `failed_chunks`; a merge
//! failure becomes an empty artifact plus a failure record.

use crate::chunking::Chunker;
use crate::config::PipelineConfig;
use crate::error::{ConfigError, PipelineError};
use crate::extractor::{ChunkExtractor, JsonLdExtractor, TripleExtractor};
use crate::pdf::extract_pdf_text;
use crate::types::{ExtractionResult, FailedChunk, ProcessedResults, RunMetadata};
use futures::stream::{self, StreamExt};
use kgweave_domain::{Chunk, ExtractionMode, LlmProvider, OntologyProvider};
use kgweave_llm::AnyProvider;
use kgweave_ontology::OwlOntology;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// The extractor chosen for a run, resolved once at construction
pub enum ExtractorKind<P, O> {
    /// Subject-predicate-object triples
    Triples(TripleExtractor<P>),
    /// Ontology-conformant JSON-LD
    JsonLd(JsonLdExtractor<P, O>),
}

/// Runs one document through chunking, extraction and merging
pub struct Pipeline<P, O = OwlOntology> {
    chunker: Chunker,
    extractor: ExtractorKind<P, O>,
    mode: ExtractionMode,
    concurrency: usize,
    span: Span,
}

impl Pipeline<AnyProvider, OwlOntology> {
    /// Build the provider and ontology described by `config`
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let provider = AnyProvider::from_settings(&config.llm.to_settings())
            .map_err(|e| ConfigError::InvalidLlm(e.to_string()))?;
        Self::new(config, provider)
    }
}

impl<P: LlmProvider> Pipeline<P, OwlOntology> {
    /// Create a pipeline, loading the ontology file in JSON-LD mode
    pub fn new(config: &PipelineConfig, provider: P) -> Result<Self, ConfigError> {
        config.validate()?;

        let ontology = match (config.extraction.mode, &config.extraction.ontology_path) {
            (ExtractionMode::JsonLd, Some(path)) => Some(Arc::new(
                OwlOntology::load(path).map_err(|e| ConfigError::Ontology(e.to_string()))?,
            )),
            _ => None,
        };

        Self::build(config, provider, ontology)
    }
}

impl<P: LlmProvider, O: OntologyProvider> Pipeline<P, O> {
    /// Create a pipeline around an already loaded ontology.
    ///
    /// `extraction.ontology_path` may be unset here.
    pub fn with_ontology(
        config: &PipelineConfig,
        provider: P,
        ontology: Arc<O>,
    ) -> Result<Self, ConfigError> {
        match config.validate() {
            Ok(()) | Err(ConfigError::MissingOntology) => {}
            Err(e) => return Err(e),
        }
        Self::build(config, provider, Some(ontology))
    }

    fn build(
        config: &PipelineConfig,
        provider: P,
        ontology: Option<Arc<O>>,
    ) -> Result<Self, ConfigError> {
        let chunker = Chunker::from_config(&config.chunking)?;
        let timeout = config.llm.timeout();
        let mode = config.extraction.mode;

        let extractor = match mode {
            ExtractionMode::Triples => ExtractorKind::Triples(TripleExtractor::new(provider, timeout)),
            ExtractionMode::JsonLd => {
                let ontology = ontology.ok_or(ConfigError::MissingOntology)?;
                ExtractorKind::JsonLd(
                    JsonLdExtractor::new(provider, ontology, timeout)
                        .with_validation(config.extraction.enable_validation)
                        .with_normalization(config.extraction.enable_normalization),
                )
            }
        };

        let span = info_span!("pipeline", mode = %mode);
        span.in_scope(|| {
            info!(
                "Pipeline initialized: {} mode, chunk size {}, overlap {}",
                mode,
                chunker.chunk_size(),
                chunker.overlap()
            )
        });

        Ok(Self {
            chunker,
            extractor,
            mode,
            concurrency: config.extraction.concurrency.max(1),
            span,
        })
    }

    /// Log every run inside `span` instead of the default `pipeline` span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Extraction mode
    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    /// The chunker in use
    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Process one document of plain text
    pub async fn process_text(&self, text: &str) -> Result<ExtractionResult, PipelineError> {
        self.run_text(text).instrument(self.span.clone()).await
    }

    /// Extract text from a PDF (optionally only some 0-based pages) and process it
    pub async fn process_pdf(
        &self,
        path: impl AsRef<Path>,
        pages: Option<&[usize]>,
    ) -> Result<ExtractionResult, PipelineError> {
        let path = path.as_ref().to_path_buf();
        self.span
            .in_scope(|| info!("Processing PDF: {}", path.display()));

        let pages = pages.map(<[usize]>::to_vec);
        let text = tokio::task::spawn_blocking(move || {
            let bytes = std::fs::read(&path).map_err(|e| {
                PipelineError::Internal(format!("PDF processing error: {}: {}", path.display(), e))
            })?;
            extract_pdf_text(&bytes, pages.as_deref())
        })
        .await
        .map_err(|e| PipelineError::Internal(format!("PDF extraction task failed: {}", e)))??;

        self.process_text(&text).await
    }

    async fn run_text(&self, text: &str) -> Result<ExtractionResult, PipelineError> {
        let started = Instant::now();
        info!("Starting text processing");

        let chunks = self.chunker.split(text);
        if chunks.is_empty() {
            error!("No chunks were created from the input text");
            return Err(PipelineError::NoChunks);
        }
        info!("Created {} chunks for processing", chunks.len());

        let (processed, model_name) = match &self.extractor {
            ExtractorKind::Triples(extractor) => (
                self.run_chunks(extractor, &chunks).await,
                extractor.model_name().to_string(),
            ),
            ExtractorKind::JsonLd(extractor) => (
                self.run_chunks(extractor, &chunks).await,
                extractor.model_name().to_string(),
            ),
        };

        let metadata = RunMetadata {
            run_id: Uuid::now_v7(),
            mode: self.mode,
            model_name,
            processing_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            "Text processing completed: {} of {} chunks failed",
            processed.statistics.failed_chunks(),
            processed.statistics.total_chunks()
        );
        Ok(ExtractionResult::new(processed, metadata))
    }

    async fn run_chunks<E: ChunkExtractor>(&self, extractor: &E, chunks: &[Chunk]) -> ProcessedResults {
        let total = chunks.len();

        let outcomes = if self.concurrency <= 1 {
            let mut outcomes = Vec::with_capacity(total);
            for chunk in chunks {
                info!("Processing chunk {}/{}", chunk.chunk_number, total);
                outcomes.push((chunk.chunk_number, extractor.extract_from_chunk(chunk).await));
            }
            outcomes
        } else {
            info!("Processing {} chunks, {} at a time", total, self.concurrency);
            let mut outcomes: Vec<_> = stream::iter(chunks)
                .map(|chunk| async move {
                    (chunk.chunk_number, extractor.extract_from_chunk(chunk).await)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;
            // Merge in document order so first-seen provenance is stable
            outcomes.sort_by_key(|(n, _)| *n);
            outcomes
        };

        let mut outputs = Vec::new();
        let mut failed_chunks = Vec::new();
        for (chunk_number, outcome) in outcomes {
            match outcome {
                Ok(data) => outputs.push(data),
                Err(e) => {
                    warn!("Chunk {} failed: {}", chunk_number, e);
                    failed_chunks.push(FailedChunk::new(chunk_number, e.to_string()));
                }
            }
        }

        extractor.process_results(outputs, failed_chunks)
    }
}
