//! Repository source implementations
//!
//! | Source | Description |
//! |--------|-------------|
//! | [`LocalRepositorySource`] | Git-aware walk of a local checkout |
//! | [`InMemoryRepositorySource`] | Files held in memory, for tests and embedding |

/// Local checkout source
pub mod local;
/// In-memory source
pub mod memory;

pub use local::LocalRepositorySource;
pub use memory::InMemoryRepositorySource;
