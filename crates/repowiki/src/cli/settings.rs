//! `repowiki config`

use std::path::PathBuf;

use anyhow::bail;
use clap::Subcommand;
use repowiki_infrastructure::config::{AppConfig, ConfigLoader};
use repowiki_infrastructure::constants::DEFAULT_CONFIG_FILENAME;

use super::Output;

/// Configuration commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Write a configuration file with default values
    Init {
        /// Destination file
        #[arg(long, default_value = DEFAULT_CONFIG_FILENAME)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub(super) fn execute(config: &AppConfig, command: ConfigCommand) -> anyhow::Result<Output> {
    match command {
        ConfigCommand::Show => Ok(Output::Text(toml::to_string_pretty(config)?)),
        ConfigCommand::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists; pass --force to overwrite", path.display());
            }
            ConfigLoader::new().save_to_file(&AppConfig::default(), &path)?;
            Ok(Output::Text(format!("wrote {}", path.display())))
        }
    }
}
