//! Configuration commands

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use brewbite_e2e::SuiteConfig;

use crate::output::{print_document, print_success, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration (file, then environment, then defaults)
    Show,

    /// Write a configuration file with every default spelled out
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn execute(cmd: ConfigCommands, path: &Path, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = SuiteConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?
                .with_env_overrides()?;
            print_document(&config, format)?;
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let yaml = SuiteConfig::default().to_yaml()?;
            std::fs::write(path, yaml)
                .with_context(|| format!("failed to write {}", path.display()))?;
            print_success(&format!("Wrote default configuration to {}", path.display()));
        }
    }
    Ok(())
}
