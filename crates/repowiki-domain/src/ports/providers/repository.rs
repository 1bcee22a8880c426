//! Repository Source Port
//!
//! Read-only access to the files of a repository. Capture enumerates every
//! tracked path through [`RepositorySource::list_paths`] and then reads each
//! one; the source decides what "tracked" means (gitignore rules, filters).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::snapshot::RepositoryIdentity;
use crate::error::Result;
use crate::value_objects::PathFilters;

/// Metadata of one enumerated path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Path relative to the repository root, `/`-separated
    pub path: String,
    /// Size reported by the source, informational
    pub size: u64,
    /// Last modification time, if the source knows it
    pub modified_at: Option<DateTime<Utc>>,
}

impl SourceEntry {
    /// Create an entry without a modification time
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            modified_at: None,
        }
    }
}

/// Repository Source Interface
///
/// # Example
///
/// ```ignore
/// use repowiki_domain::ports::providers::RepositorySource;
/// use repowiki_domain::value_objects::PathFilters;
///
/// let entries = source.list_paths(&PathFilters::all()).await?;
/// for entry in entries {
///     let bytes = source.read(&entry.path).await?;
///     println!("{} ({} bytes)", entry.path, bytes.len());
/// }
/// ```
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Identity of the repository this source reads
    fn identity(&self) -> RepositoryIdentity;

    /// Enumerate tracked paths matching the filters, sorted by path
    async fn list_paths(&self, filters: &PathFilters) -> Result<Vec<SourceEntry>>;

    /// Read the full content of a tracked path
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Short name of the source implementation (e.g. "local", "memory")
    fn source_name(&self) -> &str;
}
