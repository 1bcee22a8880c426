//! `repowiki versions` and `repowiki diagrams`

use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Args, Subcommand};
use repowiki_application::WikiCacheServiceInterface;
use repowiki_domain::ports::providers::RepositorySource;
use repowiki_domain::{RepositoryIdentity, WikiVersion};
use repowiki_infrastructure::AppContext;
use serde_json::json;
use tracing::info;

use super::Output;

/// Stored version commands
#[derive(Subcommand, Debug)]
pub enum VersionsCommand {
    /// List every version, retired ones flagged
    List {
        /// Repository checkout
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// Show a version, or one page of it
    Show {
        /// Repository checkout
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Version number; the latest when omitted
        #[arg(long)]
        number: Option<u64>,

        /// Print only this page's Markdown body
        #[arg(long)]
        page: Option<String>,
    },

    /// Retire a version so it is no longer served
    Retire {
        /// Repository checkout
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Version number
        #[arg(long)]
        number: u64,
    },

    /// Write a version's pages as Markdown files
    Export {
        /// Repository checkout
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Version number; the latest when omitted
        #[arg(long)]
        number: Option<u64>,

        /// Destination directory
        #[arg(long)]
        out: PathBuf,
    },
}

/// Arguments of `repowiki diagrams`
#[derive(Args, Debug)]
pub struct DiagramsArgs {
    /// Repository checkout
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Version number; the latest when omitted
    #[arg(long)]
    pub number: Option<u64>,
}

fn identity(context: &AppContext, repo: &Path) -> anyhow::Result<RepositoryIdentity> {
    Ok(context.open_repository(repo)?.identity())
}

pub(super) async fn execute(context: &AppContext, command: VersionsCommand) -> anyhow::Result<Output> {
    let cache = context.cache_service();
    match command {
        VersionsCommand::List { repo } => {
            let repository = identity(context, &repo)?;
            Output::json(&cache.list_versions(&repository).await?)
        }
        VersionsCommand::Show { repo, number, page } => {
            let repository = identity(context, &repo)?;
            let version = cache.show(&repository, number).await?;
            match page {
                Some(id) => {
                    let page = version
                        .page(&id)
                        .ok_or_else(|| anyhow!("version {} has no page {id}", version.number))?;
                    Ok(Output::Text(page.body.clone()))
                }
                None => Output::json(&version),
            }
        }
        VersionsCommand::Retire { repo, number } => {
            let repository = identity(context, &repo)?;
            cache.retire(&repository, number).await?;
            Ok(Output::Text(format!("retired version {number}")))
        }
        VersionsCommand::Export { repo, number, out } => {
            let repository = identity(context, &repo)?;
            let version = cache.show(&repository, number).await?;
            let written = export(&version, &out).await?;
            Ok(Output::Json(json!({
                "version": version.number,
                "directory": out,
                "files": written,
            })))
        }
    }
}

pub(super) async fn diagrams(context: &AppContext, args: DiagramsArgs) -> anyhow::Result<Output> {
    let repository = identity(context, &args.repo)?;
    let report = context
        .cache_service()
        .diagram_report(&repository, args.number)
        .await?;
    Output::json(&report)
}

/// One `<id>.md` per page plus an ordered `index.md`
async fn export(version: &WikiVersion, out: &Path) -> anyhow::Result<Vec<String>> {
    tokio::fs::create_dir_all(out)
        .await
        .with_context(|| format!("Failed to create {}", out.display()))?;

    let mut index = format!("# Wiki (version {})\n\n", version.number);
    let mut written = Vec::with_capacity(version.pages.len() + 1);
    for page in &version.pages {
        let file = format!("{}.md", file_stem(&page.id));
        tokio::fs::write(out.join(&file), &page.body)
            .await
            .with_context(|| format!("Failed to write {file}"))?;
        writeln!(index, "- [{}]({file})", page.title)?;
        written.push(file);
    }

    tokio::fs::write(out.join("index.md"), index)
        .await
        .context("Failed to write index.md")?;
    written.push("index.md".to_string());
    info!(version = version.number, pages = version.pages.len(), "Exported wiki");
    Ok(written)
}

fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
