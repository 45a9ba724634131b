//! kgweave Domain Layer
//!
//! Value types and seam traits shared by every other kgweave crate. Nothing
//! here performs I/O: LLM calls and ontology loading are implemented by
//! infrastructure crates behind the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Chunk**: a bounded, possibly overlapping word window of the input text
//! - **Triple**: a subject-predicate-object statement, before and after normalization
//! - **Extraction mode**: plain triples or ontology-conformant JSON-LD
//! - **Ontology info**: the closed vocabulary an ontology exposes to prompts

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod mode;
pub mod ontology;
pub mod traits;
pub mod triple;

// Re-exports for convenience
pub use chunk::Chunk;
pub use mode::ExtractionMode;
pub use ontology::OntologyInfo;
pub use traits::{CompletionRequest, LlmProvider, OntologyProvider};
pub use triple::{NormalizedTriple, RawTriple, TripleKey};
