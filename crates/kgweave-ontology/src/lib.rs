//! kgweave Ontology Layer
//!
//! Implements the `OntologyProvider` trait from `kgweave-domain` on top of
//! oxigraph's RDF parsers.
//!
//! # Responsibilities
//!
//! - Load an OWL ontology (RDF/XML, Turtle or N-Triples) and derive its classes,
//!   object properties, data properties and base IRI
//! - Build the authoritative JSON-LD `@context` for that vocabulary
//! - Validate that JSON-LD only uses terms the context defines
//! - Normalize JSON-LD by parsing it into an RDF graph and compacting it back
//!
//! # Examples
//!
//! ```
//! use kgweave_ontology::{OntologyFormat, OwlOntology};
//! use kgweave_domain::OntologyProvider;
//!
//! let ttl = r#"
//! @prefix owl: <http://www.w3.org/2002/07/owl#> .
//! @prefix ex: <http://example.org/science#> .
//! <http://example.org/science> a owl:Ontology .
//! ex:Person a owl:Class .
//! ex:name a owl:DatatypeProperty .
//! "#;
//!
//! let ontology = OwlOntology::from_source(ttl, OntologyFormat::Turtle).unwrap();
//! assert_eq!(ontology.info().classes, vec!["Person".to_string()]);
//! assert_eq!(ontology.info().base_iri, "http://example.org/science#");
//! ```

#![warn(missing_docs)]

mod compact;
pub mod context;
pub mod loader;

use thiserror::Error;

pub use context::ContextTerms;
pub use loader::{OntologyFormat, OwlOntology};

/// Errors that can occur while loading an ontology or handling JSON-LD
#[derive(Error, Debug)]
pub enum OntologyError {
    /// Ontology file does not exist
    #[error("Ontology file not found: {0}")]
    NotFound(String),

    /// File extension does not map to a supported RDF syntax
    #[error("Unsupported ontology format: {0}")]
    UnsupportedFormat(String),

    /// I/O error while reading the ontology
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ontology source is not valid RDF
    #[error("Ontology parse error: {0}")]
    Parse(String),

    /// JSON-LD document could not be interpreted as RDF
    #[error("Invalid JSON-LD: {0}")]
    InvalidJsonLd(String),

    /// A key is not defined by the ontology context
    #[error("Invalid term '{term}' at path '{path}'")]
    UnknownTerm {
        /// The offending key
        term: String,
        /// JSON path where it was found
        path: String,
    },

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
