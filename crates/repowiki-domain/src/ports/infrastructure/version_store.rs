//! Version Store Port
//!
//! Persists immutable wiki versions per repository. The store owns the
//! latest-version pointer; the only way to add a version is
//! [`VersionStore::create`], which enforces the latest+1 rule.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::entities::snapshot::RepositoryIdentity;
use crate::entities::wiki::WikiVersion;
use crate::error::Result;
use crate::value_objects::{VersionHandle, VersionSummary};

/// Lazy, finite sequence of version summaries in ascending number order.
///
/// Calling [`VersionStore::list`] again restarts the sequence.
pub type VersionSummaryStream<'a> = Pin<Box<dyn Stream<Item = Result<VersionSummary>> + Send + 'a>>;

/// Version Store Interface
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
/// use repowiki_domain::ports::infrastructure::VersionStore;
///
/// let mut versions = store.list(&identity);
/// while let Some(summary) = versions.next().await {
///     let summary = summary?;
///     println!("v{} retired={}", summary.number, summary.retired);
/// }
/// ```
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Persist a version atomically.
    ///
    /// Fails with `Error::Conflict` unless `version.number` is exactly one
    /// past the highest number stored for the repository (retired included).
    async fn create(&self, version: &WikiVersion) -> Result<VersionHandle>;

    /// Highest non-retired version, if any
    async fn latest(&self, repository: &RepositoryIdentity) -> Result<Option<WikiVersion>>;

    /// Highest version number ever created (retired included), 0 when none
    async fn head_number(&self, repository: &RepositoryIdentity) -> Result<u64>;

    /// Fetch a version; retired or missing versions are `Error::NotFound`
    async fn get(&self, repository: &RepositoryIdentity, number: u64) -> Result<WikiVersion>;

    /// Summaries of every version, retired ones flagged
    fn list<'a>(&'a self, repository: &'a RepositoryIdentity) -> VersionSummaryStream<'a>;

    /// Hide a version from `get` and `latest`; numbers are never reused
    async fn retire(&self, repository: &RepositoryIdentity, number: u64) -> Result<()>;

    /// Short name of the store implementation
    fn store_name(&self) -> &str;
}
