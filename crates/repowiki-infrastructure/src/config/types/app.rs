//! Main application configuration

use repowiki_domain::constants::DEFAULT_RETRIEVAL_PASSAGES;
use serde::{Deserialize, Serialize};

use super::{CacheConfig, GenerationConfig, LoggingConfig, RepositoryConfig};
use crate::constants::DEFAULT_CONFLICT_RETRIES;

/// Run behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunConfig {
    /// Extra whole-run attempts after a version conflict
    pub conflict_retries: u32,

    /// Passages requested per page; 0 disables retrieval
    pub retrieval_passages: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
            retrieval_passages: DEFAULT_RETRIEVAL_PASSAGES,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Version store location and locking
    pub cache: CacheConfig,

    /// Which repository files are tracked
    pub repository: RepositoryConfig,

    /// Generation backend
    pub generation: GenerationConfig,

    /// Run behaviour
    pub run: RunConfig,
}
