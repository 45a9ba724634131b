//! Subject-predicate-object triples
//!
//! A [`RawTriple`] is what the LLM client hands back for one chunk: three
//! non-empty strings tagged with the chunk they came from. Normalizing it
//! lowercases and trims every field and collapses runs of whitespace, giving a
//! [`NormalizedTriple`] whose `(subject, predicate, object)` tuple is the
//! identity used for deduplication.

use serde::{Deserialize, Serialize};

/// Deduplication identity of a triple. Provenance is not part of it.
pub type TripleKey = (String, String, String);

/// A triple candidate as produced by the LLM client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTriple {
    /// Subject entity
    pub subject: String,

    /// Relationship
    pub predicate: String,

    /// Object entity or literal
    pub object: String,

    /// Chunk the triple was extracted from
    pub chunk: usize,
}

/// A canonicalized triple with first-seen provenance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedTriple {
    /// Lowercased, whitespace-collapsed subject
    pub subject: String,

    /// Lowercased, whitespace-collapsed predicate
    pub predicate: String,

    /// Lowercased, whitespace-collapsed object
    pub object: String,

    /// Chunk of the earliest occurrence (informational only)
    pub source_chunk: usize,
}

impl RawTriple {
    /// Create a new raw triple
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
        chunk: usize,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            chunk,
        }
    }

    /// Check the triple shape: all three fields non-empty after trimming
    pub fn validate(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("subject is empty".to_string());
        }
        if self.predicate.trim().is_empty() {
            return Err("predicate is empty".to_string());
        }
        if self.object.trim().is_empty() {
            return Err("object is empty".to_string());
        }
        Ok(())
    }

    /// Canonicalize case and whitespace.
    ///
    /// Returns `None` when any field is empty after normalization.
    pub fn normalize(&self) -> Option<NormalizedTriple> {
        let subject = canonical(&self.subject);
        let predicate = canonical(&self.predicate);
        let object = canonical(&self.object);

        if subject.is_empty() || predicate.is_empty() || object.is_empty() {
            return None;
        }

        Some(NormalizedTriple {
            subject,
            predicate,
            object,
            source_chunk: self.chunk,
        })
    }
}

impl NormalizedTriple {
    /// Identity tuple used for deduplication
    pub fn key(&self) -> TripleKey {
        (
            self.subject.clone(),
            self.predicate.clone(),
            self.object.clone(),
        )
    }

    /// View a normalized triple as raw input again (used when re-merging)
    pub fn to_raw(&self) -> RawTriple {
        RawTriple::new(
            self.subject.clone(),
            self.predicate.clone(),
            self.object.clone(),
            self.source_chunk,
        )
    }
}

fn canonical(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
