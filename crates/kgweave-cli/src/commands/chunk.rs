//! Chunk command implementation.

use crate::cli::ChunkArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use kgweave_extractor::Chunker;
use std::fs;

/// Execute the chunk command.
pub fn execute_chunk(args: ChunkArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let chunking = &config.pipeline.chunking;
    let chunker = Chunker::new(
        args.chunk_size.unwrap_or(chunking.chunk_size),
        args.overlap.unwrap_or(chunking.chunk_overlap),
    )?;

    let text = fs::read_to_string(&args.input)?;
    let chunks = chunker.split(&text);

    println!("{}", formatter.format_chunks(&chunks)?);
    if formatter.format() == OutputFormat::Table {
        println!(
            "{}",
            formatter.info(&format!(
                "{} chunks of at most {} words (overlap {})",
                chunks.len(),
                chunker.chunk_size(),
                chunker.overlap()
            ))
        );
    }

    Ok(())
}
