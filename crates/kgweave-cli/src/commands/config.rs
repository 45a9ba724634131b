//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs, PresetArg};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            println!("{}", formatter.format_config(config)?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init { preset, force } => {
            init_config(path, preset, force)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote configuration to {}", path.display()))
            );
        }
    }
    Ok(())
}

/// Write a fresh configuration file, refusing to clobber one unless `force`.
fn init_config(path: &Path, preset: Option<PresetArg>, force: bool) -> Result<Config> {
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }

    let mut config = Config::default();
    if let Some(preset) = preset {
        config.pipeline = preset.pipeline();
    }
    config.save_to(path)?;
    Ok(config)
}
