//! Repository capture configuration types

use repowiki_domain::value_objects::PathFilters;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CAPTURE_CONCURRENCY, DEFAULT_MAX_FILE_SIZE};

/// Which repository files are tracked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Only paths matching one of these globs are tracked (all when empty)
    pub include: Vec<String>,

    /// Paths matching any of these globs are skipped
    pub exclude: Vec<String>,

    /// Track dotfiles and dot-directories
    pub include_hidden: bool,

    /// Skip files larger than this many bytes; 0 disables the limit
    pub max_file_size: u64,

    /// Files read concurrently during capture
    pub capture_concurrency: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            include_hidden: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            capture_concurrency: DEFAULT_CAPTURE_CONCURRENCY,
        }
    }
}

impl RepositoryConfig {
    /// Include/exclude globs as passed to the repository source
    pub fn filters(&self) -> PathFilters {
        PathFilters {
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        }
    }

    /// Size limit, `None` when disabled
    pub fn size_limit(&self) -> Option<u64> {
        (self.max_file_size > 0).then_some(self.max_file_size)
    }
}
