//! Command line interface
//!
//! | Command | Description |
//! |---------|-------------|
//! | `generate` | Capture, diff and regenerate impacted pages as a new version |
//! | `versions list/show/retire/export` | Inspect and administer stored versions |
//! | `diagrams` | Pages accepted with diagram errors |
//! | `config show/init` | Effective configuration, starter config file |

mod settings;
mod generate;
mod outline;
mod versions;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use repowiki_infrastructure::config::{AppConfig, ConfigLoader};
use repowiki_infrastructure::{AppContext, init_app};
use repowiki_infrastructure::logging::init_logging;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub use settings::ConfigCommand;
pub use generate::GenerateArgs;
pub use outline::load_outline;
pub use versions::{DiagramsArgs, VersionsCommand};

/// Command line interface for repowiki
#[derive(Parser, Debug)]
#[command(name = "repowiki")]
#[command(about = "Versioned, incrementally maintained wikis for source repositories")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Override the version store directory
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new wiki version for a repository
    Generate(GenerateArgs),

    /// Inspect and administer stored versions
    #[command(subcommand)]
    Versions(VersionsCommand),

    /// List pages accepted with unresolved diagram errors
    Diagrams(DiagramsArgs),

    /// Show or write configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Result of a command, printed by [`run`]
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Pretty-printed JSON document
    Json(Value),
    /// Raw text
    Text(String),
}

impl Output {
    fn json<T: serde::Serialize>(value: &T) -> anyhow::Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    fn render(&self) -> anyhow::Result<String> {
        Ok(match self {
            Self::Json(value) => serde_json::to_string_pretty(value)?,
            Self::Text(text) => text.clone(),
        })
    }
}

/// Load configuration, install logging and run the command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load().context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(directory) = cli.cache_dir {
        config.cache.directory = Some(directory);
    }
    init_logging(&config.logging)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            interrupt.cancel();
        }
    });

    let output = execute(config, cli.command, cancel).await?;
    println!("{}", output.render()?);
    Ok(())
}

/// Run one command against an already loaded configuration
pub async fn execute(
    config: AppConfig,
    command: Command,
    cancel: CancellationToken,
) -> anyhow::Result<Output> {
    match command {
        Command::Config(command) => settings::execute(&config, command),
        Command::Generate(args) => generate::execute(&open(config).await?, args, cancel).await,
        Command::Versions(command) => versions::execute(&open(config).await?, command).await,
        Command::Diagrams(args) => versions::diagrams(&open(config).await?, args).await,
    }
}

async fn open(config: AppConfig) -> anyhow::Result<AppContext> {
    init_app(config).await.context("Failed to initialize")
}
