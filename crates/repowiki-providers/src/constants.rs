//! Provider Constants
//!
//! Constants specific to provider implementations. Domain rules live in
//! `repowiki_domain::constants`.

use std::time::Duration;

// ============================================================================
// HTTP CONSTANTS
// ============================================================================

/// JSON content type header value
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Error message prefix for request timeouts
pub const ERROR_MSG_REQUEST_TIMEOUT: &str = "Request timed out after";

// ============================================================================
// OLLAMA CONSTANTS
// ============================================================================

/// Default Ollama server URL
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default generation model
pub const OLLAMA_DEFAULT_MODEL: &str = "qwen2.5-coder:7b";

/// Streaming generation endpoint
pub const OLLAMA_GENERATE_PATH: &str = "/api/generate";

// ============================================================================
// VERSION STORE CONSTANTS
// ============================================================================

/// Directory holding published versions of one repository
pub const STORE_VERSIONS_DIR: &str = "versions";

/// Directory holding in-flight bundles of one repository
pub const STORE_STAGING_DIR: &str = "staging";

/// Directory holding lock files
pub const STORE_LOCKS_DIR: &str = ".locks";

/// Per-repository index file
pub const STORE_INDEX_FILE: &str = "index.json";

/// Snapshot file inside a version directory
pub const STORE_SNAPSHOT_FILE: &str = "snapshot.json";

/// Pages file inside a version directory
pub const STORE_PAGES_FILE: &str = "pages.json";

/// Metadata file inside a version directory
pub const STORE_META_FILE: &str = "meta.json";

/// Marker file flagging a retired version
pub const STORE_RETIRED_MARKER: &str = "RETIRED";

/// Zero-padded width of version directory names
pub const STORE_VERSION_DIR_WIDTH: usize = 6;

// ============================================================================
// LOCK CONSTANTS
// ============================================================================

/// Default time to wait for a lock
pub const LOCK_DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between lock acquisition attempts
pub const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Default timeout for one generation request, including the streamed body
pub const OLLAMA_DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
