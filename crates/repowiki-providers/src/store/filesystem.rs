//! Filesystem version store
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/.locks/<repo-key>.lock
//! <root>/<repo-key>/index.json                 head + latest non-retired number
//! <root>/<repo-key>/staging/<uuid>/            in-flight bundles, never read
//! <root>/<repo-key>/versions/000001/meta.json
//! <root>/<repo-key>/versions/000001/snapshot.json
//! <root>/<repo-key>/versions/000001/pages.json
//! <root>/<repo-key>/versions/000001/RETIRED    present once retired
//! ```
//!
//! A bundle is written to a fresh staging directory, flushed, and published
//! with one rename into `versions/`. Writers of the same repository are
//! serialized by a lock file; the version number is checked against the
//! highest published directory while the lock is held. `index.json` is
//! derived data: readers fall back to scanning `versions/` when it is
//! missing or stale.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream;
use repowiki_domain::entities::snapshot::content_hash;
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::infrastructure::{LockProvider, VersionStore, VersionSummaryStream};
use repowiki_domain::value_objects::{VersionHandle, VersionSummary};
use repowiki_domain::{RepositoryIdentity, RunMetadata, Snapshot, WikiPage, WikiVersion};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::{
    STORE_INDEX_FILE, STORE_LOCKS_DIR, STORE_META_FILE, STORE_PAGES_FILE, STORE_RETIRED_MARKER,
    STORE_SNAPSHOT_FILE, STORE_STAGING_DIR, STORE_VERSION_DIR_WIDTH, STORE_VERSIONS_DIR,
};
use crate::lock::FileLockProvider;
use crate::utils::{read_json, sync_dir, write_durable};

/// Per-version metadata persisted next to the snapshot and pages
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VersionMeta {
    repository: RepositoryIdentity,
    number: u64,
    previous: Option<u64>,
    created_at: DateTime<Utc>,
    run: RunMetadata,
    page_count: usize,
    size_bytes: u64,
    pages_checksum: String,
    snapshot_hash: String,
}

/// Derived per-repository index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RepositoryIndex {
    origin: String,
    head: u64,
    latest: Option<u64>,
}

/// Version store persisting bundles as JSON files
#[derive(Debug, Clone)]
pub struct FilesystemVersionStore {
    root: PathBuf,
    locks: FileLockProvider,
}

impl FilesystemVersionStore {
    /// Create a store rooted at `root`; directories are created lazily
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let locks = FileLockProvider::new(root.join(STORE_LOCKS_DIR));
        Self { root, locks }
    }

    /// Maximum time a writer waits for the repository lock
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.locks = self.locks.with_timeout(timeout);
        self
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove staging directories left behind by interrupted writers
    pub async fn clean_staging(&self, repository: &RepositoryIdentity) -> Result<usize> {
        let key = repository.storage_key();
        let staging = self.repo_dir(repository).join(STORE_STAGING_DIR);
        let guard = self.locks.acquire_lock(&key).await?;
        let result = remove_children(&staging).await;
        self.release(guard).await;
        let removed = result?;
        if removed > 0 {
            info!(repository = %repository, removed, "Removed stale staging directories");
        }
        Ok(removed)
    }

    fn repo_dir(&self, repository: &RepositoryIdentity) -> PathBuf {
        self.root.join(repository.storage_key())
    }

    fn version_dir(repo_dir: &Path, number: u64) -> PathBuf {
        repo_dir
            .join(STORE_VERSIONS_DIR)
            .join(format!("{number:0width$}", width = STORE_VERSION_DIR_WIDTH))
    }

    async fn release(&self, guard: repowiki_domain::ports::LockGuard) {
        if let Err(e) = self.locks.release_lock(guard).await {
            warn!(error = %e, "Failed to release store lock");
        }
    }

    /// Published version numbers in ascending order
    async fn scan_numbers(repo_dir: &Path) -> Result<Vec<u64>> {
        let versions = repo_dir.join(STORE_VERSIONS_DIR);
        let mut entries = match tokio::fs::read_dir(&versions).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::io_with_source(
                    format!("Failed to list {}", versions.display()),
                    e,
                ));
            }
        };

        let mut numbers = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io_with_source("Failed to read versions directory", e))?
        {
            if let Some(number) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u64>().ok())
            {
                numbers.push(number);
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }

    async fn is_retired(version_dir: &Path) -> Result<bool> {
        let marker = version_dir.join(STORE_RETIRED_MARKER);
        tokio::fs::try_exists(&marker).await.map_err(|e| {
            Error::io_with_source(format!("Failed to check retire marker {}", marker.display()), e)
        })
    }

    async fn version_exists(version_dir: &Path) -> Result<bool> {
        tokio::fs::try_exists(version_dir).await.map_err(|e| {
            Error::io_with_source(format!("Failed to check version {}", version_dir.display()), e)
        })
    }

    async fn head(repo_dir: &Path) -> Result<u64> {
        Ok(Self::scan_numbers(repo_dir)
            .await?
            .last()
            .copied()
            .unwrap_or(0))
    }

    /// Recompute the index from the published directories
    async fn rebuild_index(repo_dir: &Path, origin: &str) -> Result<RepositoryIndex> {
        let numbers = Self::scan_numbers(repo_dir).await?;
        let mut latest = None;
        for number in numbers.iter().rev() {
            if !Self::is_retired(&Self::version_dir(repo_dir, *number)).await? {
                latest = Some(*number);
                break;
            }
        }
        Ok(RepositoryIndex {
            origin: origin.to_string(),
            head: numbers.last().copied().unwrap_or(0),
            latest,
        })
    }

    async fn latest_number(repo_dir: &Path, origin: &str) -> Result<Option<u64>> {
        let head = Self::head(repo_dir).await?;
        let index_path = repo_dir.join(STORE_INDEX_FILE);
        if let Ok(index) = read_json::<RepositoryIndex>(&index_path, "repository index").await
            && index.head == head
        {
            // A retire interrupted before its index write leaves `latest`
            // pointing at a retired version.
            let trusted = match index.latest {
                Some(number) => !Self::is_retired(&Self::version_dir(repo_dir, number)).await?,
                None => true,
            };
            if trusted {
                return Ok(index.latest);
            }
        }
        debug!(path = %index_path.display(), "Index missing or stale, scanning versions");
        Ok(Self::rebuild_index(repo_dir, origin).await?.latest)
    }

    /// Rewrite the index atomically; callers hold the repository lock
    async fn write_index(repo_dir: &Path, origin: &str) -> Result<()> {
        let index = Self::rebuild_index(repo_dir, origin).await?;
        let bytes = serde_json::to_vec_pretty(&index)?;
        let tmp = repo_dir.join(format!("{STORE_INDEX_FILE}.tmp"));
        write_durable(&tmp, &bytes, "repository index").await?;
        tokio::fs::rename(&tmp, repo_dir.join(STORE_INDEX_FILE))
            .await
            .map_err(|e| Error::io_with_source("Failed to publish repository index", e))
    }

    async fn load(repo_dir: &Path, repository: &RepositoryIdentity, number: u64) -> Result<WikiVersion> {
        let dir = Self::version_dir(repo_dir, number);
        let not_found = || Error::not_found(format!("version {number} of {repository}"));
        if !Self::version_exists(&dir).await? || Self::is_retired(&dir).await? {
            return Err(not_found());
        }

        let meta: VersionMeta = read_json(&dir.join(STORE_META_FILE), "version metadata").await?;
        let pages_bytes = tokio::fs::read(dir.join(STORE_PAGES_FILE))
            .await
            .map_err(|e| Error::io_with_source(format!("Failed to read pages of version {number}"), e))?;
        if content_hash(&pages_bytes) != meta.pages_checksum {
            return Err(Error::store(format!(
                "pages of version {number} of {repository} fail the integrity check"
            )));
        }
        let pages: Vec<WikiPage> = serde_json::from_slice(&pages_bytes)
            .map_err(|e| Error::store_with_source(format!("Corrupt pages in version {number}"), e))?;
        let snapshot: Snapshot = read_json(&dir.join(STORE_SNAPSHOT_FILE), "snapshot").await?;
        if snapshot.content_hash != meta.snapshot_hash || !snapshot.verify() {
            return Err(Error::store(format!(
                "snapshot of version {number} of {repository} fails the integrity check"
            )));
        }

        Ok(WikiVersion {
            repository: meta.repository,
            number: meta.number,
            previous: meta.previous,
            created_at: meta.created_at,
            snapshot,
            pages,
            run: meta.run,
        })
    }

    async fn summary(repo_dir: &Path, number: u64) -> Result<VersionSummary> {
        let dir = Self::version_dir(repo_dir, number);
        let meta: VersionMeta = read_json(&dir.join(STORE_META_FILE), "version metadata").await?;
        Ok(VersionSummary {
            number,
            created_at: meta.created_at,
            page_count: meta.page_count,
            size_bytes: meta.size_bytes,
            retired: Self::is_retired(&dir).await?,
        })
    }

    /// Stage, flush and publish a bundle; the repository lock is held
    async fn create_locked(&self, repo_dir: &Path, version: &WikiVersion) -> Result<VersionHandle> {
        let key = version.repository.storage_key();
        let head = Self::head(repo_dir).await?;
        if version.number != head + 1 {
            return Err(Error::conflict(key, version.number, head));
        }

        let snapshot_bytes = serde_json::to_vec_pretty(&version.snapshot)?;
        let pages_bytes = serde_json::to_vec_pretty(&version.pages)?;
        let meta = VersionMeta {
            repository: version.repository.clone(),
            number: version.number,
            previous: version.previous,
            created_at: version.created_at,
            run: version.run.clone(),
            page_count: version.pages.len(),
            size_bytes: (snapshot_bytes.len() + pages_bytes.len()) as u64,
            pages_checksum: content_hash(&pages_bytes),
            snapshot_hash: version.snapshot.content_hash.clone(),
        };
        let meta_bytes = serde_json::to_vec_pretty(&meta)?;

        let staging = repo_dir
            .join(STORE_STAGING_DIR)
            .join(uuid::Uuid::new_v4().to_string());
        let target = Self::version_dir(repo_dir, version.number);

        let published = async {
            tokio::fs::create_dir_all(&staging)
                .await
                .map_err(|e| Error::io_with_source("Failed to create staging directory", e))?;
            write_durable(&staging.join(STORE_SNAPSHOT_FILE), &snapshot_bytes, "snapshot").await?;
            write_durable(&staging.join(STORE_PAGES_FILE), &pages_bytes, "pages").await?;
            write_durable(&staging.join(STORE_META_FILE), &meta_bytes, "version metadata").await?;
            sync_dir(&staging).await?;

            let versions = repo_dir.join(STORE_VERSIONS_DIR);
            tokio::fs::create_dir_all(&versions)
                .await
                .map_err(|e| Error::io_with_source("Failed to create versions directory", e))?;
            if Self::version_exists(&target).await? {
                return Err(Error::conflict(key.clone(), version.number, version.number));
            }
            tokio::fs::rename(&staging, &target).await.map_err(|e| {
                Error::store_with_source(format!("Failed to publish version {}", version.number), e)
            })?;
            sync_dir(&versions).await
        }
        .await;

        if let Err(e) = published {
            let _ = tokio::fs::remove_dir_all(&staging).await;
            return Err(e);
        }

        if let Err(e) = Self::write_index(repo_dir, &version.repository.origin).await {
            warn!(error = %e, "Version published but index update failed; readers will rescan");
        }

        Ok(VersionHandle {
            repository_key: key,
            number: version.number,
            location: Some(target.display().to_string()),
        })
    }
}

async fn remove_children(dir: &Path) -> Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(Error::io_with_source(format!("Failed to list {}", dir.display()), e)),
    };
    let mut removed = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_source("Failed to read staging directory", e))?
    {
        tokio::fs::remove_dir_all(entry.path()).await.map_err(|e| {
            Error::io_with_source(format!("Failed to remove {}", entry.path().display()), e)
        })?;
        removed += 1;
    }
    Ok(removed)
}

#[async_trait]
impl VersionStore for FilesystemVersionStore {
    async fn create(&self, version: &WikiVersion) -> Result<VersionHandle> {
        version.validate()?;
        let key = version.repository.storage_key();
        let repo_dir = self.repo_dir(&version.repository);

        let guard = self.locks.acquire_lock(&key).await?;
        let result = self.create_locked(&repo_dir, version).await;
        self.release(guard).await;

        let handle = result?;
        info!(
            repository = %version.repository,
            version = handle.number,
            pages = version.pages.len(),
            "Published version"
        );
        Ok(handle)
    }

    async fn latest(&self, repository: &RepositoryIdentity) -> Result<Option<WikiVersion>> {
        let repo_dir = self.repo_dir(repository);
        match Self::latest_number(&repo_dir, &repository.origin).await? {
            Some(number) => Self::load(&repo_dir, repository, number).await.map(Some),
            None => Ok(None),
        }
    }

    async fn head_number(&self, repository: &RepositoryIdentity) -> Result<u64> {
        Self::head(&self.repo_dir(repository)).await
    }

    async fn get(&self, repository: &RepositoryIdentity, number: u64) -> Result<WikiVersion> {
        Self::load(&self.repo_dir(repository), repository, number).await
    }

    fn list<'a>(&'a self, repository: &'a RepositoryIdentity) -> VersionSummaryStream<'a> {
        enum State {
            Start,
            Listing(VecDeque<u64>),
            Done,
        }

        let repo_dir = self.repo_dir(repository);
        Box::pin(stream::unfold(
            (State::Start, repo_dir),
            |(state, repo_dir)| async move {
                let mut pending = match state {
                    State::Start => match Self::scan_numbers(&repo_dir).await {
                        Ok(numbers) => VecDeque::from(numbers),
                        Err(e) => return Some((Err(e), (State::Done, repo_dir))),
                    },
                    State::Listing(pending) => pending,
                    State::Done => return None,
                };
                let number = pending.pop_front()?;
                let summary = Self::summary(&repo_dir, number).await;
                Some((summary, (State::Listing(pending), repo_dir)))
            },
        ))
    }

    async fn retire(&self, repository: &RepositoryIdentity, number: u64) -> Result<()> {
        let key = repository.storage_key();
        let repo_dir = self.repo_dir(repository);
        let dir = Self::version_dir(&repo_dir, number);

        let guard = self.locks.acquire_lock(&key).await?;
        let result = async {
            if !Self::version_exists(&dir).await? {
                return Err(Error::not_found(format!("version {number} of {repository}")));
            }
            // Already retired: still rewrite the index, which an earlier
            // interrupted retire may have left behind.
            if !Self::is_retired(&dir).await? {
                let stamp = Utc::now().to_rfc3339();
                write_durable(&dir.join(STORE_RETIRED_MARKER), stamp.as_bytes(), "retire marker")
                    .await?;
            }
            Self::write_index(&repo_dir, &repository.origin).await
        }
        .await;
        self.release(guard).await;
        result
    }

    fn store_name(&self) -> &str {
        "filesystem"
    }
}
