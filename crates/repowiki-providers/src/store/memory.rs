//! In-memory version store
//!
//! Versions are kept per repository key in insertion order, so version `n`
//! sits at index `n - 1`. The number check and the append happen under one
//! `DashMap` entry guard.

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream;
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::infrastructure::{VersionStore, VersionSummaryStream};
use repowiki_domain::value_objects::{VersionHandle, VersionSummary};
use repowiki_domain::{RepositoryIdentity, WikiVersion};

#[derive(Debug, Clone)]
struct StoredVersion {
    version: WikiVersion,
    retired: bool,
    size_bytes: u64,
}

/// Version store for tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryVersionStore {
    versions: DashMap<String, Vec<StoredVersion>>,
}

impl InMemoryVersionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repositories with at least one version
    pub fn repository_count(&self) -> usize {
        self.versions.len()
    }
}

#[async_trait]
impl VersionStore for InMemoryVersionStore {
    async fn create(&self, version: &WikiVersion) -> Result<VersionHandle> {
        version.validate()?;
        let key = version.repository.storage_key();
        let size_bytes = serde_json::to_vec(version)?.len() as u64;

        let mut entry = self.versions.entry(key.clone()).or_default();
        let head = entry.len() as u64;
        if version.number != head + 1 {
            return Err(Error::conflict(key, version.number, head));
        }
        entry.push(StoredVersion {
            version: version.clone(),
            retired: false,
            size_bytes,
        });

        Ok(VersionHandle {
            repository_key: key,
            number: version.number,
            location: None,
        })
    }

    async fn latest(&self, repository: &RepositoryIdentity) -> Result<Option<WikiVersion>> {
        Ok(self
            .versions
            .get(&repository.storage_key())
            .and_then(|versions| {
                versions
                    .iter()
                    .rev()
                    .find(|stored| !stored.retired)
                    .map(|stored| stored.version.clone())
            }))
    }

    async fn head_number(&self, repository: &RepositoryIdentity) -> Result<u64> {
        Ok(self
            .versions
            .get(&repository.storage_key())
            .map_or(0, |versions| versions.len() as u64))
    }

    async fn get(&self, repository: &RepositoryIdentity, number: u64) -> Result<WikiVersion> {
        self.versions
            .get(&repository.storage_key())
            .and_then(|versions| {
                let index = usize::try_from(number.checked_sub(1)?).ok()?;
                versions
                    .get(index)
                    .filter(|stored| !stored.retired)
                    .map(|stored| stored.version.clone())
            })
            .ok_or_else(|| Error::not_found(format!("version {number} of {repository}")))
    }

    fn list<'a>(&'a self, repository: &'a RepositoryIdentity) -> VersionSummaryStream<'a> {
        let summaries: Vec<Result<VersionSummary>> = self
            .versions
            .get(&repository.storage_key())
            .map(|versions| {
                versions
                    .iter()
                    .map(|stored| {
                        Ok(VersionSummary {
                            number: stored.version.number,
                            created_at: stored.version.created_at,
                            page_count: stored.version.pages.len(),
                            size_bytes: stored.size_bytes,
                            retired: stored.retired,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Box::pin(stream::iter(summaries))
    }

    async fn retire(&self, repository: &RepositoryIdentity, number: u64) -> Result<()> {
        let not_found = || Error::not_found(format!("version {number} of {repository}"));
        let mut versions = self
            .versions
            .get_mut(&repository.storage_key())
            .ok_or_else(not_found)?;
        let index = number
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(not_found)?;
        let stored = versions.get_mut(index).ok_or_else(not_found)?;
        stored.retired = true;
        Ok(())
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}
