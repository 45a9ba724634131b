//! Output formatting for the CLI.

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use colored::*;
use kgweave_domain::{Chunk, NormalizedTriple};
use kgweave_extractor::{ExtractedData, ExtractionResult, FailedChunk, Statistics};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const PREVIEW_WORDS: usize = 8;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a finished extraction run.
    pub fn format_result(&self, result: &ExtractionResult) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(result.to_json_pretty()?);
        }

        let mut sections = vec![
            self.heading("Statistics"),
            self.format_statistics(&result.statistics),
        ];

        match &result.data {
            ExtractedData::Triples(triples) => {
                sections.push(self.heading("Triples"));
                sections.push(self.format_triples_table(triples));
            }
            ExtractedData::Jsonld(document) => {
                sections.push(self.heading("JSON-LD"));
                sections.push(serde_json::to_string_pretty(document)?);
            }
        }

        if !result.failed_chunks.is_empty() {
            sections.push(self.heading("Failed chunks"));
            sections.push(self.format_failed_chunks(&result.failed_chunks));
        }

        sections.push(self.info(&format!(
            "Run {} with {} in {} ms",
            result.metadata.run_id, result.metadata.model_name, result.metadata.processing_time_ms
        )));

        Ok(sections.join("\n"))
    }

    /// Format run statistics as a two-column table.
    pub fn format_statistics(&self, statistics: &Statistics) -> String {
        let rows: Vec<(&str, usize)> = match statistics {
            Statistics::Triples(s) => vec![
                ("Total chunks", s.total_chunks),
                ("Processed chunks", s.processed_chunks),
                ("Failed chunks", s.failed_chunks),
                ("Total triples", s.total_triples),
                ("Unique triples", s.unique_triples),
                ("Duplicates removed", s.duplicates_removed),
                ("Discarded candidates", s.discarded_candidates),
                ("Invalid triples", s.invalid_triples),
            ],
            Statistics::JsonLd(s) => vec![
                ("Total chunks", s.total_chunks),
                ("Processed chunks", s.processed_chunks),
                ("Failed chunks", s.failed_chunks),
                ("Original entities", s.original_entities),
                ("Total entities", s.total_entities),
                ("Duplicates removed", s.duplicates_removed),
            ],
        };

        let mut builder = Builder::default();
        builder.push_record(["Metric", "Value"]);
        for (name, value) in rows {
            builder.push_record([name.to_string(), value.to_string()]);
        }
        self.render(builder)
    }

    /// Format deduplicated triples as a table.
    pub fn format_triples_table(&self, triples: &[NormalizedTriple]) -> String {
        if triples.is_empty() {
            return self.colorize("No triples extracted.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Subject", "Predicate", "Object", "Chunk"]);
        for triple in triples {
            builder.push_record([
                triple.subject.clone(),
                triple.predicate.clone(),
                triple.object.clone(),
                triple.source_chunk.to_string(),
            ]);
        }
        self.render(builder)
    }

    /// Format the failure list; the merge failure has no chunk number.
    pub fn format_failed_chunks(&self, failed: &[FailedChunk]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Chunk", "Error"]);
        for failure in failed {
            let chunk = failure
                .chunk_number
                .map_or_else(|| "merge".to_string(), |n| n.to_string());
            builder.push_record([chunk, failure.error.clone()]);
        }
        self.colorize(&self.render(builder), "red")
    }

    /// Format a chunking preview.
    pub fn format_chunks(&self, chunks: &[Chunk]) -> Result<String> {
        if self.format == OutputFormat::Json {
            let rows: Vec<serde_json::Value> = chunks
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "chunk_number": c.chunk_number,
                        "words": c.word_count(),
                        "text": c.text,
                    })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&rows)?);
        }

        if chunks.is_empty() {
            return Ok(self.colorize("No chunks: input is empty.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Chunk", "Words", "Preview"]);
        for chunk in chunks {
            builder.push_record([
                chunk.chunk_number.to_string(),
                chunk.word_count().to_string(),
                preview(&chunk.text),
            ]);
        }
        Ok(self.render(builder))
    }

    /// Format the effective configuration, API key masked.
    pub fn format_config(&self, config: &Config) -> Result<String> {
        let masked = config.masked();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&masked)?),
            OutputFormat::Table => masked.to_toml(),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn heading(&self, title: &str) -> String {
        if self.color_enabled {
            title.bold().cyan().to_string()
        } else {
            title.to_string()
        }
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn preview(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= PREVIEW_WORDS {
        words.join(" ")
    } else {
        format!("{} ...", words[..PREVIEW_WORDS].join(" "))
    }
}
