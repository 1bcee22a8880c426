//! Advisory Lock Provider Port
//!
//! Serializes writers of the same repository inside one store.

use async_trait::async_trait;

use crate::error::Result;

/// Lock guard token returned when a lock is acquired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockGuard {
    /// Lock key
    pub key: String,
    /// Unique token for this acquisition
    pub token: String,
}

/// Advisory lock provider interface
#[async_trait]
pub trait LockProvider: Send + Sync {
    /// Acquire the lock for a key, waiting up to the provider's timeout
    async fn acquire_lock(&self, key: &str) -> Result<LockGuard>;

    /// Release a previously acquired lock
    async fn release_lock(&self, guard: LockGuard) -> Result<()>;
}
