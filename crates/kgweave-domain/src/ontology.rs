//! Ontology vocabulary summary

use serde::{Deserialize, Serialize};

/// The closed vocabulary an ontology offers to the JSON-LD extractor.
///
/// Names are local names (the fragment or last path segment of each IRI).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyInfo {
    /// Class names
    pub classes: Vec<String>,

    /// Object property names (IRI-valued)
    pub object_properties: Vec<String>,

    /// Data property names (literal-valued)
    pub data_properties: Vec<String>,

    /// Base IRI that local names resolve against
    pub base_iri: String,
}

impl OntologyInfo {
    /// Whether a local name is any known class or property
    pub fn is_known_term(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
            || self.object_properties.iter().any(|p| p == name)
            || self.data_properties.iter().any(|p| p == name)
    }

    /// Total number of terms in the vocabulary
    pub fn term_count(&self) -> usize {
        self.classes.len() + self.object_properties.len() + self.data_properties.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_terms() {
        let info = OntologyInfo {
            classes: vec!["Person".to_string()],
            object_properties: vec!["discovered".to_string()],
            data_properties: vec!["name".to_string()],
            base_iri: "http://example.org/science#".to_string(),
        };
        assert!(info.is_known_term("Person"));
        assert!(info.is_known_term("name"));
        assert!(!info.is_known_term("bornIn"));
        assert_eq!(info.term_count(), 3);
    }
}
