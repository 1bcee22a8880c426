//! In-memory repository source

use async_trait::async_trait;
use dashmap::DashMap;
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::providers::{RepositorySource, SourceEntry};
use repowiki_domain::value_objects::PathFilters;
use repowiki_domain::RepositoryIdentity;

use crate::utils::PathFilter;

/// Repository whose files live in memory; contents may change between runs
#[derive(Debug)]
pub struct InMemoryRepositorySource {
    identity: RepositoryIdentity,
    files: DashMap<String, Vec<u8>>,
}

impl InMemoryRepositorySource {
    /// Create an empty repository
    pub fn new(identity: RepositoryIdentity) -> Self {
        Self {
            identity,
            files: DashMap::new(),
        }
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    /// Add or replace a file
    pub fn insert(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    /// Remove a file
    pub fn remove(&self, path: &str) -> bool {
        self.files.remove(path).is_some()
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the repository has no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl RepositorySource for InMemoryRepositorySource {
    fn identity(&self) -> RepositoryIdentity {
        self.identity.clone()
    }

    async fn list_paths(&self, filters: &PathFilters) -> Result<Vec<SourceEntry>> {
        let filter = PathFilter::new(filters)?;
        let mut entries: Vec<SourceEntry> = self
            .files
            .iter()
            .filter(|file| filter.matches(file.key()))
            .map(|file| SourceEntry::new(file.key().clone(), file.value().len() as u64))
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .map(|file| file.value().clone())
            .ok_or_else(|| Error::not_found(format!("file {path}")))
    }

    fn source_name(&self) -> &str {
        "memory"
    }
}
