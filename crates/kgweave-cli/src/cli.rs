//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use kgweave_domain::ExtractionMode;
use kgweave_extractor::PipelineConfig;
use kgweave_llm::ProviderKind;
use std::path::PathBuf;

/// kgweave - Extract knowledge graphs from documents with an LLM.
#[derive(Debug, Parser)]
#[command(name = "kgweave")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.kgweave/config.toml)
    #[arg(short, long, global = true, env = "KGWEAVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `kgweave_extractor=debug`
    #[arg(long, global = true, env = "KGWEAVE_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract triples or JSON-LD from a document
    Extract(ExtractArgs),

    /// Preview how a document would be chunked (no LLM calls)
    Chunk(ChunkArgs),

    /// Upload a JSON-LD file to a GraphDB repository
    Upload(UploadArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Plain text file to process
    #[arg(required_unless_present = "pdf", conflicts_with = "pdf")]
    pub input: Option<PathBuf>,

    /// Read the document from a PDF instead
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Only these 0-based PDF pages (comma separated)
    #[arg(long, value_delimiter = ',', requires = "pdf")]
    pub pages: Option<Vec<usize>>,

    /// Extraction mode
    #[arg(short, long, value_enum, env = "KGWEAVE_MODE")]
    pub mode: Option<ModeArg>,

    /// OWL ontology file (required for jsonld)
    #[arg(long, env = "KGWEAVE_ONTOLOGY")]
    pub ontology: Option<PathBuf>,

    /// Start from a preset instead of the configured pipeline tuning
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// LLM provider
    #[arg(long, value_enum, env = "KGWEAVE_PROVIDER")]
    pub provider: Option<ProviderArg>,

    /// Model name
    #[arg(long, env = "KGWEAVE_MODEL")]
    pub model: Option<String>,

    /// API base URL (OpenAI-compatible servers, Ollama endpoint)
    #[arg(long, env = "KGWEAVE_API_BASE")]
    pub api_base: Option<String>,

    /// Words per chunk
    #[arg(long, env = "KGWEAVE_CHUNK_SIZE")]
    pub chunk_size: Option<usize>,

    /// Words shared by consecutive chunks
    #[arg(long, env = "KGWEAVE_CHUNK_OVERLAP")]
    pub overlap: Option<usize>,

    /// Chunks extracted at once
    #[arg(long, env = "KGWEAVE_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Skip ontology validation of JSON-LD chunks
    #[arg(long)]
    pub no_validation: bool,

    /// Skip per-chunk RDF normalization
    #[arg(long)]
    pub no_normalization: bool,

    /// Write the full result as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the chunk command.
#[derive(Debug, Parser)]
pub struct ChunkArgs {
    /// Plain text file to chunk
    pub input: PathBuf,

    /// Words per chunk
    #[arg(long, env = "KGWEAVE_CHUNK_SIZE")]
    pub chunk_size: Option<usize>,

    /// Words shared by consecutive chunks
    #[arg(long, env = "KGWEAVE_CHUNK_OVERLAP")]
    pub overlap: Option<usize>,
}

/// Arguments for the upload command.
#[derive(Debug, Parser)]
pub struct UploadArgs {
    /// JSON-LD file, or an extraction result with a `jsonld` field
    pub file: PathBuf,

    /// Repository id
    #[arg(short, long, env = "KGWEAVE_REPOSITORY")]
    pub repo: Option<String>,

    /// GraphDB base URL
    #[arg(long, env = "KGWEAVE_GRAPHDB_URL")]
    pub base_url: Option<String>,

    /// Named graph IRI to upload into
    #[arg(short, long)]
    pub graph: Option<String>,
}

/// Arguments for config management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (API key masked)
    Show,

    /// Write a configuration file
    Init {
        /// Pipeline preset to start from
        #[arg(long, value_enum)]
        preset: Option<PresetArg>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

/// Extraction mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// Subject-predicate-object triples
    Triples,
    /// Ontology-conformant JSON-LD
    Jsonld,
}

/// Provider argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderArg {
    /// OpenAI-compatible chat completions
    Openai,
    /// Anthropic messages API
    Anthropic,
    /// Local Ollama server
    Ollama,
}

/// Pipeline preset argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PresetArg {
    /// Balanced defaults
    Default,
    /// Small chunks, four at a time
    Fast,
    /// Large overlap, patient retries
    Thorough,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<ModeArg> for ExtractionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Triples => ExtractionMode::Triples,
            ModeArg::Jsonld => ExtractionMode::JsonLd,
        }
    }
}

impl From<ProviderArg> for ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Openai => ProviderKind::Openai,
            ProviderArg::Anthropic => ProviderKind::Anthropic,
            ProviderArg::Ollama => ProviderKind::Ollama,
        }
    }
}

impl PresetArg {
    /// The pipeline configuration this preset stands for
    pub fn pipeline(self) -> PipelineConfig {
        match self {
            PresetArg::Default => PipelineConfig::default(),
            PresetArg::Fast => PipelineConfig::fast(),
            PresetArg::Thorough => PipelineConfig::thorough(),
        }
    }
}
