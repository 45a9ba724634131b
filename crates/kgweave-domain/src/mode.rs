//! Extraction modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of structured knowledge a pipeline run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Subject-predicate-object string triples
    #[default]
    Triples,
    /// Ontology-conformant JSON-LD entity graph
    JsonLd,
}

impl ExtractionMode {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Triples => "triples",
            ExtractionMode::JsonLd => "jsonld",
        }
    }

    /// Whether this mode needs an ontology collaborator
    pub fn requires_ontology(&self) -> bool {
        matches!(self, ExtractionMode::JsonLd)
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "triples" => Ok(ExtractionMode::Triples),
            "jsonld" | "json-ld" => Ok(ExtractionMode::JsonLd),
            other => Err(format!("Unsupported extraction mode: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("triples".parse::<ExtractionMode>().unwrap(), ExtractionMode::Triples);
        assert_eq!("JSONLD".parse::<ExtractionMode>().unwrap(), ExtractionMode::JsonLd);
        assert_eq!("json-ld".parse::<ExtractionMode>().unwrap(), ExtractionMode::JsonLd);
        assert!("rdf".parse::<ExtractionMode>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ExtractionMode::JsonLd).unwrap();
        assert_eq!(json, "\"jsonld\"");
        let mode: ExtractionMode = serde_json::from_str("\"triples\"").unwrap();
        assert_eq!(mode, ExtractionMode::Triples);
    }

    #[test]
    fn test_requires_ontology() {
        assert!(ExtractionMode::JsonLd.requires_ontology());
        assert!(!ExtractionMode::Triples.requires_ontology());
    }
}
