//! Tests for snapshot capture

use std::sync::Arc;

use async_trait::async_trait;
use repowiki_application::SnapshotCapture;
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::providers::{RepositorySource, SourceEntry};
use repowiki_domain::value_objects::PathFilters;
use repowiki_domain::RepositoryIdentity;
use repowiki_providers::repository::InMemoryRepositorySource;

use crate::test_utils::{five_file_source, identity};

/// Source whose reads of one path always fail
struct UnreadablePath {
    inner: InMemoryRepositorySource,
    broken: &'static str,
}

#[async_trait]
impl RepositorySource for UnreadablePath {
    fn identity(&self) -> RepositoryIdentity {
        self.inner.identity()
    }

    async fn list_paths(&self, filters: &PathFilters) -> Result<Vec<SourceEntry>> {
        self.inner.list_paths(filters).await
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        if path == self.broken {
            return Err(Error::io(format!("permission denied: {path}")));
        }
        self.inner.read(path).await
    }

    fn source_name(&self) -> &str {
        "unreadable"
    }
}

#[tokio::test]
async fn captures_every_tracked_file() {
    let capture = SnapshotCapture::new(Arc::new(five_file_source()), 3);
    let snapshot = capture.capture(&PathFilters::all()).await.unwrap();

    assert_eq!(snapshot.len(), 5);
    assert_eq!(snapshot.repository, identity());
    assert!(snapshot.verify());
    let record = snapshot.get("src/cli.rs").unwrap();
    assert_eq!(record.size, "pub fn main() {}".len() as u64);
}

#[tokio::test]
async fn identical_content_gives_identical_hash() {
    let first = SnapshotCapture::new(Arc::new(five_file_source()), 1)
        .capture(&PathFilters::all())
        .await
        .unwrap();
    let second = SnapshotCapture::new(Arc::new(five_file_source()), 8)
        .capture(&PathFilters::all())
        .await
        .unwrap();
    assert!(first.same_content(&second));
}

#[tokio::test]
async fn empty_repository_is_a_capture_error() {
    let capture = SnapshotCapture::new(Arc::new(InMemoryRepositorySource::new(identity())), 4);
    let err = capture.capture(&PathFilters::all()).await.unwrap_err();
    assert!(matches!(err, Error::Capture { .. }));
}

#[tokio::test]
async fn one_unreadable_file_fails_the_whole_capture() {
    let source = UnreadablePath {
        inner: five_file_source(),
        broken: "src/store.rs",
    };
    let capture = SnapshotCapture::new(Arc::new(source), 4);
    let err = capture.capture(&PathFilters::all()).await.unwrap_err();
    assert!(matches!(err, Error::Capture { .. }));
    assert!(err.to_string().contains("src/store.rs"));
}

#[tokio::test]
async fn filters_limit_the_snapshot() {
    let capture = SnapshotCapture::new(Arc::new(five_file_source()), 4);
    let filters = PathFilters {
        include: vec!["src/**".to_string()],
        exclude: vec!["src/store/**".to_string()],
    };
    let snapshot = capture.capture(&filters).await.unwrap();
    let paths: Vec<&str> = snapshot.paths().collect();
    assert_eq!(paths, vec!["src/cli.rs", "src/lib.rs", "src/store.rs"]);
}
