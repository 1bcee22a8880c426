//! Domain layer constants
//!
//! Contains constants that are part of the domain rules and are shared by
//! the application layer and the providers. Infrastructure-specific
//! constants remain in `repowiki_infrastructure::constants`.

// ============================================================================
// REPAIR LOOP CONSTANTS
// ============================================================================

/// Maximum number of repair rounds a single page may consume
pub const MAX_REPAIR_ATTEMPTS: u32 = 3;

/// Fence language marking a diagram block inside a page body
pub const DIAGRAM_FENCE_LANGUAGE: &str = "mermaid";

// ============================================================================
// VERSIONING CONSTANTS
// ============================================================================

/// Number assigned to the first version of a repository
pub const FIRST_VERSION_NUMBER: u64 = 1;

/// Number of hex characters of the identity digest used as a storage key
pub const REPOSITORY_KEY_LENGTH: usize = 16;

// ============================================================================
// RUN CONSTANTS
// ============================================================================

/// Default number of pages generated concurrently within one run
pub const DEFAULT_GENERATION_CONCURRENCY: usize = 4;

/// Default number of passages requested from the retrieval port per page
pub const DEFAULT_RETRIEVAL_PASSAGES: usize = 8;
