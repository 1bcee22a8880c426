//! Infrastructure Ports
//!
//! Persistence of wiki versions and the advisory locks that serialize
//! writers of the same repository.

/// Advisory lock port
pub mod lock;
/// Version store port
pub mod version_store;

pub use lock::{LockGuard, LockProvider};
pub use version_store::{VersionStore, VersionSummaryStream};
