//! Cross-chunk merging and deduplication
//!
//! Triples are deduplicated on their normalized `(subject, predicate, object)`
//! key, keeping the provenance of the first occurrence. JSON-LD graphs are
//! concatenated and round-tripped through one RDF graph, which merges every
//! statement that is semantically the same.

use crate::error::MergeError;
use kgweave_domain::{NormalizedTriple, OntologyProvider, RawTriple, TripleKey};
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::debug;

/// Outcome of triple deduplication
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripleMerge {
    /// Unique triples, in first-seen order
    pub triples: Vec<NormalizedTriple>,
    /// Valid triples seen before deduplication
    pub total_triples: usize,
    /// Inputs dropped because a field was empty after normalization
    pub invalid_triples: usize,
}

/// Normalize and deduplicate `triples`, keeping first-seen provenance
pub fn dedup_triples<'a, I>(triples: I) -> TripleMerge
where
    I: IntoIterator<Item = &'a RawTriple>,
{
    let mut seen: HashSet<TripleKey> = HashSet::new();
    let mut merge = TripleMerge::default();

    for raw in triples {
        let Some(triple) = raw.normalize() else {
            merge.invalid_triples += 1;
            continue;
        };
        merge.total_triples += 1;
        if seen.insert(triple.key()) {
            merge.triples.push(triple);
        }
    }

    debug!(
        "Deduplicated {} triples into {} ({} invalid)",
        merge.total_triples,
        merge.triples.len(),
        merge.invalid_triples
    );
    merge
}

/// Outcome of merging JSON-LD graphs
#[derive(Debug, Clone, PartialEq)]
pub struct JsonLdMerge {
    /// Normalized `{"@context", "@graph"}` document
    pub document: Value,
    /// Entities across all inputs before merging
    pub original_entities: usize,
    /// Entities in the merged graph
    pub final_entities: usize,
}

impl JsonLdMerge {
    /// Entities collapsed by the merge; zero if normalization split entities apart
    pub fn duplicates_removed(&self) -> usize {
        self.original_entities.saturating_sub(self.final_entities)
    }
}

/// Merge per-chunk JSON-LD documents into one normalized graph.
///
/// Documents without a `@graph` array contribute nothing.
pub fn merge_jsonld<O>(ontology: &O, documents: &[Value]) -> Result<JsonLdMerge, MergeError>
where
    O: OntologyProvider + ?Sized,
{
    let context = &ontology.context()["@context"];
    let id_terms = id_valued_terms(context);
    let id_terms = &id_terms;

    // Blank node labels are scoped to their own chunk document
    let graph: Vec<Value> = documents
        .iter()
        .enumerate()
        .filter_map(|(index, doc)| {
            doc.get("@graph")
                .and_then(Value::as_array)
                .map(|nodes| (index, nodes))
        })
        .flat_map(|(index, nodes)| {
            nodes
                .iter()
                .map(move |node| scope_blank_nodes(node, index, false, id_terms))
        })
        .collect();
    let original_entities = graph.len();

    let merged = json!({
        "@context": context.clone(),
        "@graph": graph,
    });

    let document = ontology
        .normalize_jsonld(&merged)
        .map_err(|e| MergeError::Normalization(e.to_string()))?;
    let final_entities = document
        .get("@graph")
        .and_then(Value::as_array)
        .map(Vec::len)
        .ok_or(MergeError::MissingGraph)?;

    Ok(JsonLdMerge {
        document,
        original_entities,
        final_entities,
    })
}

/// Context terms declared `"@type": "@id"`, whose string values are node references
fn id_valued_terms(context: &Value) -> HashSet<String> {
    context
        .as_object()
        .map(|terms| {
            terms
                .iter()
                .filter(|(_, def)| def.get("@type").and_then(Value::as_str) == Some("@id"))
                .map(|(term, _)| term.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// Rewrite every blank node label `_:x` in `value` to `_:d{doc}_x`.
///
/// `as_reference` marks values of `@id` or of an id-valued term, where a bare
/// string names a node; anywhere else strings are literals and left alone.
fn scope_blank_nodes(value: &Value, doc: usize, as_reference: bool, id_terms: &HashSet<String>) -> Value {
    match value {
        Value::String(label) if as_reference => match label.strip_prefix("_:") {
            Some(local) => Value::String(format!("_:d{}_{}", doc, local)),
            None => value.clone(),
        },
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| scope_blank_nodes(item, doc, as_reference, id_terms))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| {
                    let reference = key == "@id" || id_terms.contains(key);
                    (key.clone(), scope_blank_nodes(v, doc, reference, id_terms))
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Empty document under the ontology context
pub fn empty_jsonld<O>(ontology: &O) -> Value
where
    O: OntologyProvider + ?Sized,
{
    json!({
        "@context": ontology.context()["@context"].clone(),
        "@graph": [],
    })
}
