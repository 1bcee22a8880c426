//! Version store handles and summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to a persisted version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionHandle {
    /// Repository storage key
    pub repository_key: String,
    /// Version number
    pub number: u64,
    /// Where the store keeps the bundle, if it has a location
    pub location: Option<String>,
}

/// Summary row yielded by `VersionStore::list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    /// Version number
    pub number: u64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Number of pages
    pub page_count: usize,
    /// Serialized bundle size in bytes
    pub size_bytes: u64,
    /// Whether the version was retired
    pub retired: bool,
}
