//! Version store configuration types

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONFIG_DIR, DEFAULT_LOCK_TIMEOUT_SECS, FALLBACK_CACHE_DIR};

/// Where and how wiki versions are stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// Store root; the user cache directory when unset
    pub directory: Option<PathBuf>,

    /// Seconds a writer waits for the repository lock
    pub lock_timeout_secs: u64,

    /// Remove staging leftovers of crashed runs before each run
    pub clean_staging: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: None,
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
            clean_staging: true,
        }
    }
}

impl CacheConfig {
    /// Store root after applying the fallbacks
    pub fn resolved_directory(&self) -> PathBuf {
        match &self.directory {
            Some(directory) => directory.clone(),
            None => dirs::cache_dir().map_or_else(
                || PathBuf::from(FALLBACK_CACHE_DIR),
                |dir| dir.join(DEFAULT_CONFIG_DIR),
            ),
        }
    }

    /// Lock wait as a duration
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }
}
