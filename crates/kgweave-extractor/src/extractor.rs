//! Per-chunk extractors behind a common capability trait

use crate::error::ChunkError;
use crate::merger::{self, JsonLdMerge, TripleMerge};
use crate::prompt::PromptBuilder;
use crate::types::{
    ExtractedData, FailedChunk, JsonLdStatistics, ProcessedResults, Statistics, TripleStatistics,
};
use kgweave_domain::{Chunk, ExtractionMode, LlmProvider, OntologyProvider, RawTriple};
use kgweave_llm::{ExtractionClient, LlmPayload};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Result of extracting one chunk
pub type ChunkOutcome<T> = Result<T, ChunkError>;

/// The capability every extraction mode provides
pub trait ChunkExtractor: Send + Sync {
    /// Structured data produced for one chunk
    type Output: Send;

    /// Make exactly one LLM call for `chunk` and validate what comes back
    fn extract_from_chunk(
        &self,
        chunk: &Chunk,
    ) -> impl Future<Output = ChunkOutcome<Self::Output>> + Send;

    /// Merge all successful outputs and compute statistics
    fn process_results(
        &self,
        outputs: Vec<Self::Output>,
        failed_chunks: Vec<FailedChunk>,
    ) -> ProcessedResults;

    /// Local shape check deciding whether a chunk succeeded
    fn validate_data(&self, data: &Self::Output) -> bool;

    /// Model behind the LLM client
    fn model_name(&self) -> &str;
}

/// Triples parsed from one chunk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripleBatch {
    /// Well-formed candidates, tagged with the chunk number
    pub triples: Vec<RawTriple>,
    /// Items the client dropped as malformed
    pub discarded: usize,
}

/// Extracts subject-predicate-object triples
pub struct TripleExtractor<P> {
    client: ExtractionClient<P>,
    prompts: PromptBuilder,
}

impl<P: LlmProvider> TripleExtractor<P> {
    /// Create a triple extractor bounded by `timeout` per LLM call
    pub fn new(provider: P, timeout: Duration) -> Self {
        let prompts = PromptBuilder::triples();
        let client = ExtractionClient::new(provider, ExtractionMode::Triples, prompts.system_prompt())
            .with_timeout(timeout);
        Self { client, prompts }
    }
}

impl<P: LlmProvider> ChunkExtractor for TripleExtractor<P> {
    type Output = TripleBatch;

    async fn extract_from_chunk(&self, chunk: &Chunk) -> ChunkOutcome<TripleBatch> {
        let n = chunk.chunk_number;
        info!("Processing chunk {} for triple extraction", n);

        let prompt = self.prompts.user_prompt(&chunk.text);
        let payload = self.client.extract(&prompt, n).await.map_err(|e| {
            error!("Failed to extract triples from chunk {}: {}", n, e);
            ChunkError::from(e)
        })?;

        let LlmPayload::Triples(candidates) = payload else {
            return Err(ChunkError::UnexpectedFormat {
                chunk: n,
                reason: "expected a list of triples".to_string(),
            });
        };

        let batch = TripleBatch {
            triples: candidates.triples,
            discarded: candidates.discarded,
        };
        if !self.validate_data(&batch) {
            warn!("Invalid triple data from chunk {}", n);
            return Err(ChunkError::InvalidTriples(n));
        }

        info!("Successfully extracted {} triples from chunk {}", batch.triples.len(), n);
        Ok(batch)
    }

    fn process_results(
        &self,
        outputs: Vec<TripleBatch>,
        failed_chunks: Vec<FailedChunk>,
    ) -> ProcessedResults {
        let discarded_candidates = outputs.iter().map(|b| b.discarded).sum();
        let processed_chunks = outputs.len();

        let TripleMerge {
            triples,
            total_triples,
            invalid_triples,
        } = merger::dedup_triples(outputs.iter().flat_map(|b| b.triples.iter()));

        let statistics = TripleStatistics {
            total_chunks: processed_chunks + failed_chunks.len(),
            processed_chunks,
            failed_chunks: failed_chunks.len(),
            total_triples,
            unique_triples: triples.len(),
            duplicates_removed: total_triples - triples.len(),
            discarded_candidates,
            invalid_triples,
        };

        info!(
            "Processed {} triples, {} unique after deduplication",
            statistics.total_triples, statistics.unique_triples
        );

        ProcessedResults {
            data: ExtractedData::Triples(triples),
            statistics: Statistics::Triples(statistics),
            failed_chunks,
        }
    }

    fn validate_data(&self, data: &TripleBatch) -> bool {
        data.triples.iter().all(|t| t.validate().is_ok())
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

/// Extracts ontology-conformant JSON-LD
pub struct JsonLdExtractor<P, O> {
    client: ExtractionClient<P>,
    prompts: PromptBuilder,
    ontology: Arc<O>,
    enable_validation: bool,
    enable_normalization: bool,
}

impl<P: LlmProvider, O: OntologyProvider> JsonLdExtractor<P, O> {
    /// Create a JSON-LD extractor for `ontology`
    pub fn new(provider: P, ontology: Arc<O>, timeout: Duration) -> Self {
        let prompts =
            PromptBuilder::jsonld(ontology.info(), ontology.context(), ontology.owl_content());
        let client = ExtractionClient::new(provider, ExtractionMode::JsonLd, prompts.system_prompt())
            .with_timeout(timeout);

        Self {
            client,
            prompts,
            ontology,
            enable_validation: true,
            enable_normalization: true,
        }
    }

    /// Toggle ontology validation of each chunk
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = enabled;
        self
    }

    /// Toggle per-chunk RDF normalization
    pub fn with_normalization(mut self, enabled: bool) -> Self {
        self.enable_normalization = enabled;
        self
    }

    /// The ontology in use
    pub fn ontology(&self) -> &O {
        &self.ontology
    }

    /// Replace whatever `@context` the model produced with the ontology's own
    fn repair_context(&self, data: Map<String, Value>) -> Value {
        let mut fixed = Map::new();
        fixed.insert(
            "@context".to_string(),
            self.ontology.context()["@context"].clone(),
        );
        fixed.extend(data.into_iter().filter(|(k, _)| k != "@context"));
        debug!("Replaced LLM context with ontology context");
        Value::Object(fixed)
    }

    fn process_extracted(&self, data: Value, n: usize) -> ChunkOutcome<Value> {
        let data = match data {
            Value::String(text) => serde_json::from_str(&text).map_err(|e| {
                warn!("Invalid JSON in chunk {}", n);
                ChunkError::UnexpectedFormat {
                    chunk: n,
                    reason: format!("string payload is not JSON: {}", e),
                }
            })?,
            other => other,
        };

        let Value::Object(map) = data else {
            return Err(ChunkError::UnexpectedFormat {
                chunk: n,
                reason: "expected a JSON object with @graph".to_string(),
            });
        };
        if !map.contains_key("@graph") {
            return Err(ChunkError::UnexpectedFormat {
                chunk: n,
                reason: "missing @graph".to_string(),
            });
        }

        let fixed = self.repair_context(map);

        if self.enable_validation {
            self.ontology.validate_jsonld(&fixed).map_err(|e| {
                warn!("JSON-LD validation failed for chunk {}: {}", n, e);
                ChunkError::Validation {
                    chunk: n,
                    reason: e.to_string(),
                }
            })?;
        }

        if !self.enable_normalization {
            return Ok(fixed);
        }
        self.ontology
            .normalize_jsonld(&fixed)
            .map_err(|e| ChunkError::Normalization {
                chunk: n,
                reason: e.to_string(),
            })
    }
}

impl<P: LlmProvider, O: OntologyProvider> ChunkExtractor for JsonLdExtractor<P, O> {
    type Output = Value;

    async fn extract_from_chunk(&self, chunk: &Chunk) -> ChunkOutcome<Value> {
        let n = chunk.chunk_number;
        info!("Processing chunk {} for JSON-LD extraction", n);

        let prompt = self.prompts.user_prompt(&chunk.text);
        let payload = self.client.extract(&prompt, n).await.map_err(|e| {
            error!("Failed to extract JSON-LD from chunk {}: {}", n, e);
            ChunkError::from(e)
        })?;

        let LlmPayload::JsonLd(data) = payload else {
            return Err(ChunkError::UnexpectedFormat {
                chunk: n,
                reason: "expected a JSON-LD document".to_string(),
            });
        };

        let document = self.process_extracted(data, n)?;
        if !self.validate_data(&document) {
            return Err(ChunkError::UnexpectedFormat {
                chunk: n,
                reason: "processed document has no @graph array".to_string(),
            });
        }

        info!("Successfully extracted and validated JSON-LD from chunk {}", n);
        Ok(document)
    }

    fn process_results(&self, outputs: Vec<Value>, mut failed_chunks: Vec<FailedChunk>) -> ProcessedResults {
        let total_chunks = outputs.len() + failed_chunks.len();

        match merger::merge_jsonld(self.ontology.as_ref(), &outputs) {
            Ok(JsonLdMerge {
                document,
                original_entities,
                final_entities,
            }) => {
                let statistics = JsonLdStatistics {
                    total_chunks,
                    processed_chunks: outputs.len(),
                    failed_chunks: failed_chunks.len(),
                    total_entities: final_entities,
                    original_entities,
                    duplicates_removed: original_entities.saturating_sub(final_entities),
                };
                info!(
                    "Processed {} entities, {} duplicates removed",
                    statistics.total_entities, statistics.duplicates_removed
                );

                ProcessedResults {
                    data: ExtractedData::Jsonld(document),
                    statistics: Statistics::JsonLd(statistics),
                    failed_chunks,
                }
            }
            Err(e) => {
                error!("Error processing JSON-LD results: {}", e);
                failed_chunks.push(FailedChunk::merge(e.to_string()));

                ProcessedResults {
                    data: ExtractedData::Jsonld(merger::empty_jsonld(self.ontology.as_ref())),
                    statistics: Statistics::JsonLd(JsonLdStatistics {
                        total_chunks,
                        processed_chunks: 0,
                        failed_chunks: total_chunks,
                        ..JsonLdStatistics::default()
                    }),
                    failed_chunks,
                }
            }
        }
    }

    fn validate_data(&self, data: &Value) -> bool {
        data.get("@graph").is_some_and(Value::is_array)
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgweave_llm::MockProvider;

    fn chunk(text: &str, n: usize) -> Chunk {
        Chunk::new(text, n)
    }

    #[tokio::test]
    async fn test_triple_extraction_success() {
        let provider = MockProvider::new(
            r#"[{"subject": "marie curie", "predicate": "discovered", "object": "radium"}]"#,
        );
        let extractor = TripleExtractor::new(provider, Duration::from_secs(5));

        let batch = extractor
            .extract_from_chunk(&chunk("Marie Curie discovered radium.", 2))
            .await
            .unwrap();
        assert_eq!(batch.triples.len(), 1);
        assert_eq!(batch.triples[0].chunk, 2);
    }

    #[tokio::test]
    async fn test_triple_prompt_carries_chunk_text() {
        let provider = MockProvider::new("[]");
        let extractor = TripleExtractor::new(provider.clone(), Duration::from_secs(5));

        extractor
            .extract_from_chunk(&chunk("Pierre Curie was a physicist.", 1))
            .await
            .unwrap();
        assert_eq!(provider.call_count(), 1);
        assert!(provider.prompts()[0].contains("Pierre Curie was a physicist."));
    }

    #[tokio::test]
    async fn test_whitespace_field_fails_chunk() {
        let provider =
            MockProvider::new(r#"[{"subject": "  ", "predicate": "discovered", "object": "radium"}]"#);
        let extractor = TripleExtractor::new(provider, Duration::from_secs(5));

        let result = extractor.extract_from_chunk(&chunk("text", 4)).await;
        assert_eq!(result, Err(ChunkError::InvalidTriples(4)));
    }

    #[tokio::test]
    async fn test_unparseable_response_fails_chunk() {
        let provider = MockProvider::new("I could not find any triples.");
        let extractor = TripleExtractor::new(provider, Duration::from_secs(5));

        let result = extractor.extract_from_chunk(&chunk("text", 1)).await;
        assert!(matches!(result, Err(ChunkError::Llm(_))));
    }

    #[test]
    fn test_triple_statistics() {
        let extractor = TripleExtractor::new(MockProvider::new("[]"), Duration::from_secs(5));
        let outputs = vec![
            TripleBatch {
                triples: vec![RawTriple::new("Marie Curie", "discovered", "Radium", 1)],
                discarded: 1,
            },
            TripleBatch {
                triples: vec![
                    RawTriple::new("marie curie", "DISCOVERED", "radium", 2),
                    RawTriple::new("marie curie", "won", "nobel prize", 2),
                ],
                discarded: 0,
            },
        ];

        let processed = extractor.process_results(outputs, vec![FailedChunk::new(3, "timeout")]);
        let Statistics::Triples(stats) = processed.statistics else {
            panic!("expected triple statistics");
        };
        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.processed_chunks, 2);
        assert_eq!(stats.failed_chunks, 1);
        assert_eq!(stats.total_triples, 3);
        assert_eq!(stats.unique_triples, 2);
        assert_eq!(stats.duplicates_removed, 1);
        assert_eq!(stats.discarded_candidates, 1);
        assert_eq!(processed.failed_chunks.len(), 1);
    }
}
