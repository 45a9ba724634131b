//! Upload command implementation.

use crate::cli::UploadArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use kgweave_store::GraphDbStore;
use serde_json::Value;
use std::fs;

/// Execute the upload command.
pub async fn execute_upload(args: UploadArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let repo = args
        .repo
        .or_else(|| config.store.repository.clone())
        .ok_or_else(|| {
            CliError::InvalidInput("no repository given; use --repo or set store.repository".to_string())
        })?;
    let base_url = args.base_url.unwrap_or_else(|| config.store.base_url.clone());

    let contents = fs::read_to_string(&args.file)?;
    let document = jsonld_document(serde_json::from_str(&contents)?)?;

    let store = GraphDbStore::new(base_url, repo)?;
    store.upload_jsonld(&document, args.graph.as_deref()).await?;

    println!(
        "{}",
        formatter.success(&format!(
            "Uploaded {} to {}",
            args.file.display(),
            store.statements_url()
        ))
    );
    Ok(())
}

/// Accept either a bare JSON-LD document or a saved extraction result.
fn jsonld_document(value: Value) -> Result<Value> {
    let document = match value {
        Value::Object(mut map) if map.contains_key("jsonld") && !map.contains_key("@graph") => {
            map.remove("jsonld").unwrap_or(Value::Null)
        }
        other => other,
    };

    if !document.is_object() {
        return Err(CliError::InvalidInput(
            "expected a JSON-LD object".to_string(),
        ));
    }
    Ok(document)
}
