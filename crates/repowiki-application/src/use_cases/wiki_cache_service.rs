//! Wiki Cache Service Use Case
//!
//! Read and retire operations over stored versions. Creation only happens
//! through a run.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::infrastructure::VersionStore;
use repowiki_domain::value_objects::VersionSummary;
use repowiki_domain::{RepositoryIdentity, WikiVersion};
use tracing::info;

use crate::ports::services::{PageDiagramErrors, WikiCacheServiceInterface};

/// Cache administration implementation
pub struct WikiCacheService {
    store: Arc<dyn VersionStore>,
}

impl WikiCacheService {
    /// Create the service over a version store
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WikiCacheServiceInterface for WikiCacheService {
    async fn list_versions(&self, repository: &RepositoryIdentity) -> Result<Vec<VersionSummary>> {
        self.store.list(repository).try_collect().await
    }

    async fn show(
        &self,
        repository: &RepositoryIdentity,
        number: Option<u64>,
    ) -> Result<WikiVersion> {
        match number {
            Some(number) => self.store.get(repository, number).await,
            None => self
                .store
                .latest(repository)
                .await?
                .ok_or_else(|| Error::not_found(format!("any version of {repository}"))),
        }
    }

    async fn retire(&self, repository: &RepositoryIdentity, number: u64) -> Result<()> {
        self.store.retire(repository, number).await?;
        info!(repository = %repository, version = number, "Retired version");
        Ok(())
    }

    async fn diagram_report(
        &self,
        repository: &RepositoryIdentity,
        number: Option<u64>,
    ) -> Result<Vec<PageDiagramErrors>> {
        let version = self.show(repository, number).await?;
        Ok(version
            .pages
            .iter()
            .filter(|page| page.has_diagram_errors())
            .map(|page| PageDiagramErrors {
                page_id: page.id.clone(),
                repair_attempts: page.metadata.repair_attempts,
                errors: page.metadata.unresolved_errors.clone(),
            })
            .collect())
    }
}
