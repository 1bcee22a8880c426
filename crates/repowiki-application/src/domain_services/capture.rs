//! Snapshot Capture
//!
//! Enumerates every tracked path of a repository source, reads and hashes
//! each file with bounded concurrency and assembles a [`Snapshot`]. Capture
//! is all-or-nothing: an empty enumeration or any unreadable file fails the
//! whole capture and no partial snapshot escapes.

use std::sync::Arc;

use chrono::Utc;
use futures::{StreamExt, TryStreamExt, stream};
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::providers::RepositorySource;
use repowiki_domain::value_objects::PathFilters;
use repowiki_domain::{FileRecord, Snapshot};
use tracing::{debug, info};

/// Captures snapshots from a repository source
pub struct SnapshotCapture {
    source: Arc<dyn RepositorySource>,
    concurrency: usize,
}

impl SnapshotCapture {
    /// Create a capture service reading at most `concurrency` files at once
    pub fn new(source: Arc<dyn RepositorySource>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// Capture a snapshot of every tracked path matching the filters
    pub async fn capture(&self, filters: &PathFilters) -> Result<Snapshot> {
        let identity = self.source.identity();
        let captured_at = Utc::now();

        let entries = self
            .source
            .list_paths(filters)
            .await
            .map_err(|e| match e {
                Error::Capture { .. } => e,
                other => Error::capture_with_source(
                    format!("failed to enumerate {identity}"),
                    other,
                ),
            })?;

        if entries.is_empty() {
            return Err(Error::capture(format!(
                "repository {identity} has no tracked files"
            )));
        }

        debug!(
            repository = %identity,
            source = self.source.source_name(),
            files = entries.len(),
            "Reading tracked files"
        );

        let source = &self.source;
        let records: Vec<FileRecord> = stream::iter(entries)
            .map(|entry| async move {
                let content = source.read(&entry.path).await.map_err(|e| {
                    Error::capture_with_source(format!("failed to read {}", entry.path), e)
                })?;
                Ok::<_, Error>(FileRecord::from_content(
                    entry.path,
                    &content,
                    entry.modified_at,
                ))
            })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        let snapshot = Snapshot::new(identity, captured_at, records)
            .map_err(|e| Error::capture_with_source("inconsistent enumeration", e))?;

        info!(
            repository = %snapshot.repository,
            files = snapshot.len(),
            bytes = snapshot.total_size(),
            hash = %&snapshot.content_hash[..12],
            "Captured snapshot"
        );
        Ok(snapshot)
    }
}
