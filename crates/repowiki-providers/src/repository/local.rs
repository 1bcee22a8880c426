//! Local repository source
//!
//! Uses the `ignore` crate (same as ripgrep) for git-aware traversal,
//! automatically respecting:
//! - `.gitignore` files (including nested ones in subdirectories)
//! - `.git/info/exclude`
//! - Global gitignore from git config
//! - Hidden files and directories (unless enabled)
//!
//! The identity is the canonical root path plus the `HEAD` revision when the
//! root is a git checkout.

use std::fs;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::providers::{RepositorySource, SourceEntry};
use repowiki_domain::value_objects::PathFilters;
use repowiki_domain::RepositoryIdentity;
use tracing::warn;

use crate::utils::PathFilter;

/// Repository source over a local directory
#[derive(Debug, Clone)]
pub struct LocalRepositorySource {
    root: PathBuf,
    identity: RepositoryIdentity,
    include_hidden: bool,
    max_file_size: Option<u64>,
}

impl LocalRepositorySource {
    /// Open a local checkout
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|e| {
            Error::capture_with_source(format!("cannot open repository {}", root.display()), e)
        })?;
        if !root.is_dir() {
            return Err(Error::capture(format!(
                "repository root {} is not a directory",
                root.display()
            )));
        }

        let mut identity = RepositoryIdentity::new(root.to_string_lossy());
        if let Some(revision) = read_head_revision(&root) {
            identity = identity.with_revision(revision);
        }

        Ok(Self {
            root,
            identity,
            include_hidden: false,
            max_file_size: None,
        })
    }

    /// Track dotfiles and dot-directories (`.git` is always skipped)
    #[must_use]
    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    /// Skip files larger than this many bytes
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: Option<u64>) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Canonical root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk directory using git-aware traversal
    fn walk_sync(
        root: &Path,
        filter: &PathFilter,
        include_hidden: bool,
        max_file_size: Option<u64>,
    ) -> Vec<SourceEntry> {
        let walker = WalkBuilder::new(root)
            .git_ignore(true)
            .git_exclude(true)
            .git_global(true)
            // Honor .gitignore even outside a git checkout
            .require_git(false)
            .hidden(!include_hidden)
            .follow_links(false)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        let mut entries = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Error walking directory: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let path = to_slash_path(relative);
            if !filter.matches(&path) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!("Failed to get metadata for {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            if max_file_size.is_some_and(|max| metadata.len() > max) {
                continue;
            }

            entries.push(SourceEntry {
                path,
                size: metadata.len(),
                modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }
}

#[async_trait]
impl RepositorySource for LocalRepositorySource {
    fn identity(&self) -> RepositoryIdentity {
        self.identity.clone()
    }

    async fn list_paths(&self, filters: &PathFilters) -> Result<Vec<SourceEntry>> {
        let filter = PathFilter::new(filters)?;
        let root = self.root.clone();
        let include_hidden = self.include_hidden;
        let max_file_size = self.max_file_size;

        tokio::task::spawn_blocking(move || {
            Self::walk_sync(&root, &filter, include_hidden, max_file_size)
        })
        .await
        .map_err(|e| Error::internal(format!("Blocking task failed: {e}")))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(Error::invalid_argument(format!(
                "path {path} is not relative to the repository root"
            )));
        }
        tokio::fs::read(self.root.join(relative))
            .await
            .map_err(|e| Error::io_with_source(format!("Failed to read {path}"), e))
    }

    fn source_name(&self) -> &str {
        "local"
    }
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve `HEAD` of a git checkout without invoking git
fn read_head_revision(root: &Path) -> Option<String> {
    let git_dir = root.join(".git");
    let head = fs::read_to_string(git_dir.join("HEAD")).ok()?;
    let head = head.trim();

    let Some(reference) = head.strip_prefix("ref:") else {
        return Some(head.to_string()).filter(|h| !h.is_empty());
    };
    let reference = reference.trim();

    if let Ok(commit) = fs::read_to_string(git_dir.join(reference)) {
        return Some(commit.trim().to_string());
    }

    // Branch may only exist in packed-refs
    let packed = fs::read_to_string(git_dir.join("packed-refs")).ok()?;
    packed.lines().find_map(|line| {
        let (commit, name) = line.split_once(' ')?;
        (name == reference).then(|| commit.to_string())
    })
}
