//! Text chunks, the unit of LLM extraction

use serde::{Deserialize, Serialize};

/// A window of whitespace-separated words taken from the input document.
///
/// Chunk numbers are 1-based and strictly increasing in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Words of the window joined by single spaces
    pub text: String,

    /// 1-based position of this chunk in the document
    pub chunk_number: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: impl Into<String>, chunk_number: usize) -> Self {
        Self {
            text: text.into(),
            chunk_number,
        }
    }

    /// Number of words in the chunk
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        let chunk = Chunk::new("marie curie discovered radium", 1);
        assert_eq!(chunk.word_count(), 4);
        assert_eq!(chunk.chunk_number, 1);
    }

    #[test]
    fn test_empty_chunk_has_no_words() {
        assert_eq!(Chunk::new("", 3).word_count(), 0);
    }
}
