//! Config command - print the effective configuration.

use std::path::PathBuf;

use xtraffic::config::config_file_path;

use super::load_config;
use crate::error::CliError;

/// Run the config command.
pub fn run(path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(path.as_deref())?;
    let source = path.unwrap_or_else(config_file_path);
    let status = if source.exists() { "" } else { " (not found, defaults)" };

    println!("; {}{}", source.display(), status);
    print!("{}", config.to_config_string());
    Ok(())
}
