//! Infrastructure layer constants
//!
//! Defaults for configuration values. Domain rules are defined in
//! `repowiki_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "repowiki.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "repowiki";

/// Environment variable prefix for configuration (`REPOWIKI_GENERATION__MODEL`)
pub const CONFIG_ENV_PREFIX: &str = "REPOWIKI";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_ENV_FILTER: &str = "REPOWIKI_LOG";

// ============================================================================
// CACHE CONSTANTS
// ============================================================================

/// Store directory used when no cache directory is available
pub const FALLBACK_CACHE_DIR: &str = ".repowiki";

/// Default time a writer waits for the repository lock
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// REPOSITORY CONSTANTS
// ============================================================================

/// Files larger than this are not tracked (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Files read concurrently during capture
pub const DEFAULT_CAPTURE_CONCURRENCY: usize = 16;

// ============================================================================
// GENERATION CONSTANTS
// ============================================================================

/// Default generation provider
pub const DEFAULT_GENERATION_PROVIDER: &str = "ollama";

/// Default timeout for one generation request
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 300;

/// Default page language
pub const DEFAULT_PAGE_LANGUAGE: &str = "English";

// ============================================================================
// RUN CONSTANTS
// ============================================================================

/// Extra whole-run attempts after a version conflict
pub const DEFAULT_CONFLICT_RETRIES: u32 = 2;
