//! Word-window chunking for large documents

use crate::config::ChunkingConfig;
use crate::error::ConfigError;
use kgweave_domain::Chunk;

/// Splits text into overlapping windows of whole words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker; requires `chunk_size > 0` and `overlap < chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
        }
        .validate()?;

        Ok(Self { chunk_size, overlap })
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self, ConfigError> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Words per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Words shared by consecutive chunks
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into chunks numbered from 1.
    ///
    /// Windows advance by `chunk_size - overlap` words and stop at the first
    /// window that reaches the end of the text, so the last chunk may be
    /// shorter. Empty or whitespace-only text yields no chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let total_words = words.len();
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_number = 1;

        while start < total_words {
            let end = (start + self.chunk_size).min(total_words);
            chunks.push(Chunk::new(words[start..end].join(" "), chunk_number));

            if end == total_words {
                break;
            }

            let next = start + step;
            if next <= start {
                break;
            }
            start = next;
            chunk_number += 1;

            // Safety break
            if chunk_number > total_words {
                break;
            }
        }

        chunks
    }

    /// Number of chunks `split` produces for `total_words` words
    pub fn expected_chunks(&self, total_words: usize) -> usize {
        if total_words == 0 {
            0
        } else if total_words <= self.chunk_size {
            1
        } else {
            let step = self.chunk_size - self.overlap;
            (total_words - self.overlap).div_ceil(step)
        }
    }
}

/// Split `text` with the given parameters
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>, ConfigError> {
    Ok(Chunker::new(chunk_size, overlap)?.split(text))
}
