//! Generation backend configuration types

use std::time::Duration;

use repowiki_domain::constants::{DEFAULT_GENERATION_CONCURRENCY, MAX_REPAIR_ATTEMPTS};
use repowiki_providers::constants::{OLLAMA_DEFAULT_BASE_URL, OLLAMA_DEFAULT_MODEL};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_GENERATION_PROVIDER, DEFAULT_GENERATION_TIMEOUT_SECS, DEFAULT_PAGE_LANGUAGE,
};

/// Generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Provider name (`ollama`)
    pub provider: String,

    /// Server URL
    pub base_url: String,

    /// Model name
    pub model: String,

    /// Seconds allowed for one request, streamed body included
    pub timeout_secs: u64,

    /// Pages generated concurrently
    pub concurrency: usize,

    /// Natural language the pages are written in
    pub language: String,

    /// Repair attempts per page, at most 3
    pub max_repair_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_GENERATION_PROVIDER.to_string(),
            base_url: OLLAMA_DEFAULT_BASE_URL.to_string(),
            model: OLLAMA_DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
            concurrency: DEFAULT_GENERATION_CONCURRENCY,
            language: DEFAULT_PAGE_LANGUAGE.to_string(),
            max_repair_attempts: MAX_REPAIR_ATTEMPTS,
        }
    }
}

impl GenerationConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
