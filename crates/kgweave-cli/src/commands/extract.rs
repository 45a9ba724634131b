//! Extract command implementation.

use crate::cli::{ExtractArgs, PresetArg};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use kgweave_domain::LlmProvider;
use kgweave_extractor::{ExtractionResult, Pipeline, PipelineConfig};
use kgweave_ontology::OwlOntology;
use std::fs;
use tracing::info;

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut pipeline_config = build_pipeline_config(&args, &config.pipeline);
    resolve_api_key(&mut pipeline_config);

    let pipeline = Pipeline::from_config(&pipeline_config)?;
    run_extraction(&pipeline, &args, formatter).await?;
    Ok(())
}

/// Run `pipeline` on the input named by `args`, print the result and
/// optionally write it to `--output`.
pub async fn run_extraction<P: LlmProvider>(
    pipeline: &Pipeline<P, OwlOntology>,
    args: &ExtractArgs,
    formatter: &Formatter,
) -> Result<ExtractionResult> {
    let result = match (&args.pdf, &args.input) {
        (Some(pdf), _) => pipeline.process_pdf(pdf, args.pages.as_deref()).await?,
        (None, Some(input)) => {
            let text = fs::read_to_string(input)?;
            pipeline.process_text(&text).await?
        }
        (None, None) => return Err(CliError::InvalidInput("no input file given".to_string())),
    };

    if let Some(path) = &args.output {
        fs::write(path, result.to_json_pretty()?)?;
        info!("Wrote extraction result to {}", path.display());
        eprintln!("{}", formatter.success(&format!("Saved result to {}", path.display())));
    }

    println!("{}", formatter.format_result(&result)?);

    if !result.failed_chunks.is_empty() {
        eprintln!(
            "{}",
            formatter.warning(&format!(
                "{} of {} chunks failed",
                result.statistics.failed_chunks(),
                result.statistics.total_chunks()
            ))
        );
    }

    Ok(result)
}

/// Layer the command-line overrides on top of the configured pipeline.
pub fn build_pipeline_config(args: &ExtractArgs, base: &PipelineConfig) -> PipelineConfig {
    let mut config = match args.preset {
        Some(preset) => apply_preset(base, preset),
        None => base.clone(),
    };

    if let Some(provider) = args.provider {
        let kind = provider.into();
        if kind != config.llm.provider {
            // Keys and endpoints belong to the configured provider
            config.llm.provider = kind;
            config.llm.model_name = kind.default_model().to_string();
            config.llm.api_key = None;
            config.llm.api_base = None;
        }
    }
    if let Some(model) = &args.model {
        config.llm.model_name = model.clone();
    }
    if let Some(api_base) = &args.api_base {
        config.llm.api_base = Some(api_base.clone());
    }

    if let Some(mode) = args.mode {
        config.extraction.mode = mode.into();
    }
    if let Some(ontology) = &args.ontology {
        config.extraction.ontology_path = Some(ontology.clone());
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunking.chunk_size = chunk_size;
    }
    if let Some(overlap) = args.overlap {
        config.chunking.chunk_overlap = overlap;
    }
    if let Some(concurrency) = args.concurrency {
        config.extraction.concurrency = concurrency;
    }
    if args.no_validation {
        config.extraction.enable_validation = false;
    }
    if args.no_normalization {
        config.extraction.enable_normalization = false;
    }

    config
}

/// Preset tuning with the configured provider and extraction target kept.
fn apply_preset(base: &PipelineConfig, preset: PresetArg) -> PipelineConfig {
    let mut config = preset.pipeline();
    config.llm.provider = base.llm.provider;
    config.llm.model_name = base.llm.model_name.clone();
    config.llm.api_key = base.llm.api_key.clone();
    config.llm.api_base = base.llm.api_base.clone();
    config.extraction.mode = base.extraction.mode;
    config.extraction.ontology_path = base.extraction.ontology_path.clone();
    config.extraction.enable_validation = base.extraction.enable_validation;
    config.extraction.enable_normalization = base.extraction.enable_normalization;
    config
}

/// Fill a missing API key from the provider's environment variable.
fn resolve_api_key(config: &mut PipelineConfig) {
    if config.llm.api_key.is_some() {
        return;
    }
    config.llm.api_key = config
        .llm
        .provider
        .api_key_env()
        .and_then(|var| std::env::var(var).ok());
}
