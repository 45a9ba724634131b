//! Integration tests for the Pipeline

#[cfg(test)]
mod tests {
    use crate::{
        ExtractionResult, Pipeline, PipelineConfig, PipelineError, Statistics,
    };
    use kgweave_domain::{ExtractionMode, OntologyInfo, OntologyProvider};
    use kgweave_llm::MockProvider;
    use kgweave_ontology::{OntologyFormat, OwlOntology};
    use serde_json::{json, Value};
    use std::sync::Arc;

    const SCIENCE_TTL: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://example.org/science#> .
<http://example.org/science> a owl:Ontology .
ex:Person a owl:Class .
ex:Element a owl:Class .
ex:discovered a owl:ObjectProperty .
ex:name a owl:DatatypeProperty .
ex:year a owl:DatatypeProperty .
"#;

    fn triples_config(chunk_size: usize, overlap: usize) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.chunking.chunk_size = chunk_size;
        config.chunking.chunk_overlap = overlap;
        config
    }

    fn jsonld_config(chunk_size: usize) -> PipelineConfig {
        let mut config = triples_config(chunk_size, 0);
        config.extraction.mode = ExtractionMode::JsonLd;
        config
    }

    fn science_ontology() -> Arc<OwlOntology> {
        Arc::new(OwlOntology::from_source(SCIENCE_TTL, OntologyFormat::Turtle).unwrap())
    }

    fn triple_stats(result: &ExtractionResult) -> &crate::TripleStatistics {
        match &result.statistics {
            Statistics::Triples(stats) => stats,
            other => panic!("expected triple statistics, got {:?}", other),
        }
    }

    fn jsonld_stats(result: &ExtractionResult) -> &crate::JsonLdStatistics {
        match &result.statistics {
            Statistics::JsonLd(stats) => stats,
            other => panic!("expected JSON-LD statistics, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_full_triple_extraction_flow() {
        let llm = MockProvider::new(
            r#"[
                {"subject": "Marie Curie", "predicate": "discovered", "object": "Radium"},
                {"subject": "marie curie", "predicate": "won", "object": "nobel prize in physics"}
            ]"#,
        );
        let pipeline = Pipeline::new(&PipelineConfig::default(), llm).unwrap();

        let result = pipeline
            .process_text("Marie Curie discovered radium and won the Nobel Prize in Physics.")
            .await
            .unwrap();

        let triples = result.triples().unwrap();
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].subject, "marie curie");
        assert_eq!(triples[0].object, "radium");
        assert_eq!(triples[0].source_chunk, 1);
        assert!(result.failed_chunks.is_empty());
        assert_eq!(result.metadata.model_name, "mock");
        assert_eq!(result.metadata.mode, ExtractionMode::Triples);
    }

    #[tokio::test]
    async fn test_duplicate_triples_across_chunks() {
        let llm = MockProvider::with_sequence([
            r#"[{"subject": "Marie Curie", "predicate": "Discovered", "object": "Radium"}]"#,
            r#"[{"subject": "marie curie", "predicate": "discovered", "object": "radium"}]"#,
        ]);
        let pipeline = Pipeline::new(&triples_config(5, 0), llm.clone()).unwrap();

        let result = pipeline
            .process_text("one two three four five six seven eight nine ten")
            .await
            .unwrap();

        assert_eq!(llm.call_count(), 2);
        let triples = result.triples().unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].source_chunk, 1);

        let stats = triple_stats(&result);
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.total_triples, 2);
        assert_eq!(stats.unique_triples, 1);
        assert_eq!(stats.duplicates_removed, 1);
    }

    #[tokio::test]
    async fn test_empty_text_fails_run() {
        let pipeline = Pipeline::new(&PipelineConfig::default(), MockProvider::new("[]")).unwrap();

        let result = pipeline.process_text("   \n  ").await;
        assert!(matches!(result, Err(PipelineError::NoChunks)));
    }

    #[tokio::test]
    async fn test_failed_chunk_does_not_abort_run() {
        let mut llm = MockProvider::new(
            r#"[{"subject": "pierre curie", "predicate": "married", "object": "marie curie"}]"#,
        );
        llm.add_error("Zeta");
        let pipeline = Pipeline::new(&triples_config(3, 0), llm).unwrap();

        let result = pipeline
            .process_text("alpha beta gamma Zeta eta theta iota kappa lambda")
            .await
            .unwrap();

        assert_eq!(result.failed_chunks.len(), 1);
        assert_eq!(result.failed_chunks[0].chunk_number, Some(2));
        assert!(!result.failed_chunks[0].error.is_empty());

        let stats = triple_stats(&result);
        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.processed_chunks, 2);
        assert_eq!(stats.failed_chunks, 1);
        assert_eq!(stats.unique_triples, 1);
    }

    #[tokio::test]
    async fn test_malformed_response_is_recorded() {
        let mut llm = MockProvider::new(r#"[{"subject": "a", "predicate": "b", "object": "c"}]"#);
        llm.add_response("Omega", "Sorry, I cannot help with that.");
        let pipeline = Pipeline::new(&triples_config(2, 0), llm).unwrap();

        let result = pipeline.process_text("alpha beta Omega delta").await.unwrap();
        assert_eq!(result.failed_chunks.len(), 1);
        assert_eq!(result.failed_chunks[0].chunk_number, Some(2));
        assert_eq!(result.triples().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_discarded_candidates_are_counted() {
        let llm = MockProvider::new(
            r#"{"triples": [
                {"subject": "a", "predicate": "b", "object": "c"},
                {"subject": "a", "predicate": "b"},
                {"subject": 1, "predicate": "b", "object": "c"}
            ]}"#,
        );
        let pipeline = Pipeline::new(&PipelineConfig::default(), llm).unwrap();

        let result = pipeline.process_text("some text").await.unwrap();
        let stats = triple_stats(&result);
        assert_eq!(stats.unique_triples, 1);
        assert_eq!(stats.discarded_candidates, 2);
    }

    #[tokio::test]
    async fn test_concurrent_provenance_is_deterministic() {
        let mut llm = MockProvider::new("[]");
        let shared = r#"[{"subject": "radium", "predicate": "is", "object": "radioactive"}]"#;
        llm.add_response("Zeta", shared);
        llm.add_response("Omega", shared);

        let mut config = triples_config(2, 0);
        config.extraction.concurrency = 4;
        let pipeline = Pipeline::new(&config, llm).unwrap();

        let result = pipeline
            .process_text("alpha beta gamma Zeta delta epsilon Omega eta")
            .await
            .unwrap();

        let triples = result.triples().unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].source_chunk, 2);
        assert_eq!(triple_stats(&result).total_chunks, 4);
    }

    #[tokio::test]
    async fn test_result_serializes_with_triples_key() {
        let llm = MockProvider::new(r#"[{"subject": "a", "predicate": "b", "object": "c"}]"#);
        let pipeline = Pipeline::new(&PipelineConfig::default(), llm).unwrap();
        let result = pipeline.process_text("text").await.unwrap();

        let value: Value = serde_json::from_str(&result.to_json_pretty().unwrap()).unwrap();
        assert!(value["triples"].is_array());
        assert!(value["statistics"].is_object());
        assert!(value["failed_chunks"].is_array());
        assert!(value["metadata"]["run_id"].is_string());
    }

    #[test]
    fn test_invalid_config_fails_at_construction() {
        let config = triples_config(10, 10);
        assert!(Pipeline::new(&config, MockProvider::new("[]")).is_err());

        let config = jsonld_config(10);
        assert!(Pipeline::new(&config, MockProvider::new("[]")).is_err());
    }

    #[test]
    fn test_missing_ontology_file_fails_at_construction() {
        let mut config = jsonld_config(10);
        config.extraction.ontology_path = Some("/no/such/ontology.owl".into());
        assert!(matches!(
            Pipeline::new(&config, MockProvider::new("[]")),
            Err(crate::ConfigError::Ontology(_))
        ));
    }

    #[tokio::test]
    async fn test_jsonld_extraction_and_merge() {
        let llm = MockProvider::with_sequence([
            r#"{
                "@context": {"Person": "http://hallucinated.org/Person"},
                "@graph": [{"@id": "http://example.org/data/curie", "@type": "Person", "name": "Marie Curie"}]
            }"#,
            r#"{
                "@graph": [
                    {"name": "Marie Curie", "@type": "Person", "@id": "http://example.org/data/curie"},
                    {"@id": "http://example.org/data/radium", "@type": "Element", "name": "Radium"}
                ]
            }"#,
        ]);
        let pipeline =
            Pipeline::with_ontology(&jsonld_config(5), llm, science_ontology()).unwrap();

        let result = pipeline
            .process_text("Marie Curie studied in Paris. She discovered radium.")
            .await
            .unwrap();

        assert!(result.failed_chunks.is_empty());
        let doc = result.jsonld().unwrap();
        assert_eq!(doc["@context"]["@vocab"], "http://example.org/science#");

        let graph = doc["@graph"].as_array().unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[0]["@id"], "http://example.org/data/curie");
        assert_eq!(graph[0]["@type"], "Person");

        let stats = jsonld_stats(&result);
        assert_eq!(stats.original_entities, 3);
        assert_eq!(stats.total_entities, 2);
        assert_eq!(stats.duplicates_removed, 1);
    }

    #[tokio::test]
    async fn test_nested_and_flat_entities_collapse() {
        let llm = MockProvider::with_sequence([
            r#"{"@graph": [{
                "@id": "http://example.org/data/curie",
                "@type": "Person",
                "discovered": {"@id": "http://example.org/data/radium", "@type": "Element"}
            }]}"#,
            r#"{"@graph": [
                {"@id": "http://example.org/data/radium", "@type": "Element"},
                {"@id": "http://example.org/data/curie", "@type": "Person",
                 "discovered": "http://example.org/data/radium"}
            ]}"#,
        ]);
        let pipeline =
            Pipeline::with_ontology(&jsonld_config(2), llm, science_ontology()).unwrap();

        let result = pipeline.process_text("alpha beta gamma delta").await.unwrap();
        assert!(result.failed_chunks.is_empty());

        let graph = result.jsonld().unwrap()["@graph"].as_array().unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[0]["@id"], "http://example.org/data/curie");
        assert_eq!(graph[0]["discovered"], "http://example.org/data/radium");
        assert_eq!(graph[1]["@id"], "http://example.org/data/radium");
        assert_eq!(graph[1]["@type"], "Element");

        let stats = jsonld_stats(&result);
        assert_eq!(stats.original_entities, 4);
        assert_eq!(stats.total_entities, 2);
        assert_eq!(stats.duplicates_removed, 2);
    }

    #[tokio::test]
    async fn test_blank_nodes_from_different_chunks_stay_distinct() {
        let llm = MockProvider::with_sequence([
            r#"{"@graph": [
                {"@id": "http://example.org/data/a", "discovered": "_:x"},
                {"@id": "http://example.org/data/b", "discovered": "_:x"},
                {"@id": "_:x", "@type": "Element", "year": 1898}
            ]}"#,
            r#"{"@graph": [
                {"@id": "http://example.org/data/c", "discovered": "_:y"},
                {"@id": "http://example.org/data/d", "discovered": "_:y"},
                {"@id": "_:y", "@type": "Element", "year": 1903}
            ]}"#,
        ]);
        let pipeline =
            Pipeline::with_ontology(&jsonld_config(3), llm, science_ontology()).unwrap();

        let result = pipeline
            .process_text("alpha beta gamma delta epsilon zeta")
            .await
            .unwrap();
        assert!(result.failed_chunks.is_empty());

        let graph = result.jsonld().unwrap()["@graph"].as_array().unwrap();
        let blanks: Vec<&Value> = graph
            .iter()
            .filter(|node| node["@id"].as_str().is_some_and(|id| id.starts_with("_:")))
            .collect();
        assert_eq!(blanks.len(), 2);

        let mut years: Vec<i64> = blanks.iter().filter_map(|node| node["year"].as_i64()).collect();
        years.sort();
        assert_eq!(years, vec![1898, 1903]);

        let target = |iri: &str| {
            graph
                .iter()
                .find(|node| node["@id"] == iri)
                .map(|node| node["discovered"].clone())
                .unwrap()
        };
        assert_eq!(target("http://example.org/data/a"), target("http://example.org/data/b"));
        assert_eq!(target("http://example.org/data/c"), target("http://example.org/data/d"));
        assert_ne!(target("http://example.org/data/a"), target("http://example.org/data/c"));

        let stats = jsonld_stats(&result);
        assert_eq!(stats.total_entities, 6);
        assert_eq!(stats.duplicates_removed, 0);
    }

    #[tokio::test]
    async fn test_unknown_property_fails_chunk() {
        let mut llm = MockProvider::new(
            r#"{"@graph": [{"@id": "http://example.org/data/curie", "@type": "Person", "name": "Marie Curie"}]}"#,
        );
        llm.add_response(
            "Zeta",
            r#"{"@graph": [{"@id": "http://example.org/data/curie", "bornIn": "Warsaw"}]}"#,
        );
        let pipeline =
            Pipeline::with_ontology(&jsonld_config(2), llm, science_ontology()).unwrap();

        let result = pipeline.process_text("alpha beta Zeta gamma").await.unwrap();

        assert_eq!(result.failed_chunks.len(), 1);
        assert_eq!(result.failed_chunks[0].chunk_number, Some(2));
        assert!(result.failed_chunks[0].error.contains("bornIn"));
        assert_eq!(jsonld_stats(&result).processed_chunks, 1);
        assert_eq!(result.jsonld().unwrap()["@graph"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_can_be_disabled() {
        let llm = MockProvider::new(
            r#"{"@graph": [{"@id": "http://example.org/data/curie", "bornIn": "Warsaw"}]}"#,
        );
        let mut config = jsonld_config(50);
        config.extraction.enable_validation = false;
        let pipeline = Pipeline::with_ontology(&config, llm, science_ontology()).unwrap();

        let result = pipeline.process_text("Marie Curie was born in Warsaw.").await.unwrap();
        assert!(result.failed_chunks.is_empty());
        assert_eq!(jsonld_stats(&result).total_entities, 1);
    }

    #[tokio::test]
    async fn test_string_payload_is_parsed_once() {
        let inner = json!({"@graph": [{"@id": "http://example.org/data/radium", "@type": "Element"}]});
        let llm = MockProvider::new(Value::String(inner.to_string()).to_string());
        let pipeline =
            Pipeline::with_ontology(&jsonld_config(50), llm, science_ontology()).unwrap();

        let result = pipeline.process_text("Radium is an element.").await.unwrap();
        assert!(result.failed_chunks.is_empty());
        assert_eq!(jsonld_stats(&result).total_entities, 1);
    }

    #[tokio::test]
    async fn test_response_without_graph_fails_chunk() {
        let llm = MockProvider::new(r#"{"@id": "http://example.org/data/radium"}"#);
        let pipeline =
            Pipeline::with_ontology(&jsonld_config(50), llm, science_ontology()).unwrap();

        let result = pipeline.process_text("Radium is an element.").await.unwrap();
        assert_eq!(result.failed_chunks.len(), 1);
        assert!(result.failed_chunks[0].error.contains("@graph"));
    }

    struct BrokenMergeOntology {
        info: OntologyInfo,
        context: Value,
    }

    impl OntologyProvider for BrokenMergeOntology {
        type Error = String;

        fn info(&self) -> &OntologyInfo {
            &self.info
        }

        fn context(&self) -> &Value {
            &self.context
        }

        fn owl_content(&self) -> &str {
            ""
        }

        fn validate_jsonld(&self, _data: &Value) -> Result<(), String> {
            Ok(())
        }

        fn normalize_jsonld(&self, _data: &Value) -> Result<Value, String> {
            Err("graph store unavailable".to_string())
        }
    }

    #[tokio::test]
    async fn test_merge_failure_is_reported_as_data() {
        let ontology = Arc::new(BrokenMergeOntology {
            info: OntologyInfo {
                base_iri: "http://example.org/science#".to_string(),
                ..OntologyInfo::default()
            },
            context: json!({"@context": {"@vocab": "http://example.org/science#"}}),
        });
        let llm = MockProvider::new(r#"{"@graph": [{"@id": "http://example.org/data/x"}]}"#);
        let mut config = jsonld_config(2);
        config.extraction.enable_normalization = false;
        let pipeline = Pipeline::with_ontology(&config, llm, ontology).unwrap();

        let result = pipeline.process_text("alpha beta gamma delta").await.unwrap();

        assert_eq!(result.jsonld().unwrap()["@graph"], json!([]));
        let merge_failure = result.failed_chunks.last().unwrap();
        assert_eq!(merge_failure.chunk_number, None);
        assert!(merge_failure.error.contains("graph store unavailable"));

        let stats = jsonld_stats(&result);
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.processed_chunks, 0);
        assert_eq!(stats.failed_chunks, 2);
        assert_eq!(stats.duplicates_removed, 0);
    }
}
