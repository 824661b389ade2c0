//! Config file management commands

use anyhow::{Context, Result, bail};
use colored::*;
use std::fs;
use std::path::Path;

use crate::cli::ConfigCommands;
use crate::config::{Config, TEMPLATE};

pub fn handle_config_command(config_path: &Path, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => {
            write_template(config_path, force)?;
            println!(
                "{} {}",
                "Config written to".green(),
                config_path.display().to_string().cyan()
            );
            println!("Fill in the list ids, field ids and people, then set AFFINITY_API_KEY.");
        }
        ConfigCommands::Show => {
            let config = Config::load(config_path)?;
            let rendered =
                toml::to_string_pretty(&config.masked()).context("Failed to serialize config")?;
            println!("{}", rendered);
            match config.validate().and_then(|_| config.api_key().map(|_| ())) {
                Ok(()) => println!("{}", "Config is valid".green()),
                Err(e) => println!("{} {}", "Config problem:".red().bold(), e),
            }
        }
        ConfigCommands::Path => {
            let marker = if config_path.exists() {
                "".normal()
            } else {
                " (missing)".yellow()
            };
            println!("{}{}", config_path.display(), marker);
        }
    }
    Ok(())
}

/// Write the starter template, refusing to clobber unless forced
pub fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, TEMPLATE)
        .with_context(|| format!("Failed to write config file: {}", path.display()))
}
