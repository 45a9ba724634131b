//! JSON-LD context construction and term resolution

use crate::OntologyError;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};

/// What an ontology term names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    /// `owl:Class`
    Class,
    /// `owl:ObjectProperty` (IRI-valued)
    ObjectProperty,
    /// `owl:DatatypeProperty` (literal-valued)
    DataProperty,
}

impl TermKind {
    /// Classes and object properties coerce string values to IRIs
    fn is_id_valued(self) -> bool {
        !matches!(self, TermKind::DataProperty)
    }
}

/// One named ontology term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDef {
    /// Local name used as the context term
    pub name: String,
    /// Full IRI
    pub iri: String,
    /// Kind of term
    pub kind: TermKind,
}

/// Bidirectional term/IRI map behind the authoritative `@context`.
///
/// When two terms share a local name the later definition wins, matching
/// how the context object itself is assembled.
#[derive(Debug, Clone, Default)]
pub struct ContextTerms {
    base_iri: String,
    by_term: BTreeMap<String, (String, TermKind)>,
    by_iri: HashMap<String, String>,
}

impl ContextTerms {
    /// Build the term map for `base_iri` and `defs`
    pub fn new(base_iri: impl Into<String>, defs: &[TermDef]) -> Self {
        let mut terms = Self {
            base_iri: base_iri.into(),
            ..Self::default()
        };
        for def in defs {
            if let Some((old_iri, _)) = terms
                .by_term
                .insert(def.name.clone(), (def.iri.clone(), def.kind))
            {
                terms.by_iri.remove(&old_iri);
            }
            terms.by_iri.insert(def.iri.clone(), def.name.clone());
        }
        terms
    }

    /// Base IRI used as `@vocab`
    pub fn base_iri(&self) -> &str {
        &self.base_iri
    }

    /// The full context document: `{"@context": {"@vocab": ..., term: {...}}}`
    pub fn to_context(&self) -> Value {
        let mut ctx = Map::new();
        ctx.insert("@vocab".to_string(), Value::String(self.base_iri.clone()));
        for (name, (iri, kind)) in &self.by_term {
            let entry = if kind.is_id_valued() {
                json!({ "@id": iri, "@type": "@id" })
            } else {
                json!({ "@id": iri })
            };
            ctx.insert(name.clone(), entry);
        }
        json!({ "@context": ctx })
    }

    /// Whether `key` is a context term, or an IRI of one
    pub fn is_valid_key(&self, key: &str) -> bool {
        if self.by_term.contains_key(key) || self.by_iri.contains_key(key) {
            return true;
        }
        // Undefined keys fall back to @vocab expansion
        let expanded = format!("{}{}", self.base_iri, key);
        self.by_iri.contains_key(&expanded)
    }

    /// Term for `iri` if the context defines one, otherwise the IRI itself
    pub fn compact_iri(&self, iri: &str) -> String {
        self.by_iri
            .get(iri)
            .cloned()
            .unwrap_or_else(|| iri.to_string())
    }

    /// Whether values of the property `iri` are written as bare IRI strings
    pub fn is_id_valued(&self, iri: &str) -> bool {
        self.by_iri
            .get(iri)
            .and_then(|term| self.by_term.get(term))
            .is_some_and(|(_, kind)| kind.is_id_valued())
    }

    /// Walk `value` and fail on the first key the context cannot resolve.
    ///
    /// Keywords are skipped, but the contents of `@graph`, `@list`, `@set`
    /// and similar containers are still checked. `@context` is never checked.
    pub fn check_terms(&self, value: &Value, path: &str) -> Result<(), OntologyError> {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if key == "@context" {
                        continue;
                    }
                    if !key.starts_with('@') && !self.is_valid_key(key) {
                        return Err(OntologyError::UnknownTerm {
                            term: key.clone(),
                            path: path.to_string(),
                        });
                    }
                    self.check_terms(child, &format!("{}.{}", path, key))?;
                }
                Ok(())
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| self.check_terms(item, &format!("{}[{}]", path, i))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://example.org/science#";

    fn terms() -> ContextTerms {
        let def = |name: &str, kind| TermDef {
            name: name.to_string(),
            iri: format!("{}{}", BASE, name),
            kind,
        };
        ContextTerms::new(
            BASE,
            &[
                def("Person", TermKind::Class),
                def("discovered", TermKind::ObjectProperty),
                def("name", TermKind::DataProperty),
            ],
        )
    }

    #[test]
    fn test_context_shape() {
        let ctx = terms().to_context();
        let inner = &ctx["@context"];
        assert_eq!(inner["@vocab"], BASE);
        assert_eq!(inner["Person"]["@type"], "@id");
        assert_eq!(inner["discovered"]["@id"], format!("{}discovered", BASE));
        assert!(inner["name"].get("@type").is_none());
    }

    #[test]
    fn test_key_resolution() {
        let terms = terms();
        assert!(terms.is_valid_key("name"));
        assert!(terms.is_valid_key("http://example.org/science#discovered"));
        assert!(!terms.is_valid_key("bornIn"));
        assert!(!terms.is_valid_key("http://example.org/other#name"));
    }

    #[test]
    fn test_compaction_and_coercion() {
        let terms = terms();
        assert_eq!(terms.compact_iri(&format!("{}name", BASE)), "name");
        assert_eq!(terms.compact_iri("http://other.org/x"), "http://other.org/x");
        assert!(terms.is_id_valued(&format!("{}discovered", BASE)));
        assert!(!terms.is_id_valued(&format!("{}name", BASE)));
    }

    #[test]
    fn test_check_terms_reports_path() {
        let doc = json!({
            "@context": {"anything": "goes"},
            "@graph": [
                {"@id": "ex:a", "name": "Marie"},
                {"@id": "ex:b", "bornIn": "Warsaw"}
            ]
        });

        match terms().check_terms(&doc, "") {
            Err(OntologyError::UnknownTerm { term, path }) => {
                assert_eq!(term, "bornIn");
                assert_eq!(path, ".@graph[1]");
            }
            other => panic!("expected unknown term, got {:?}", other),
        }
    }

    #[test]
    fn test_check_terms_nested_objects() {
        let doc = json!({"@graph": [{"discovered": {"@id": "ex:r", "name": "Radium"}}]});
        assert!(terms().check_terms(&doc, "").is_ok());
    }
}
