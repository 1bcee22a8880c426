//! Repository Snapshot Entities
//!
//! A snapshot is the content-addressed manifest of every tracked file of a
//! repository at capture time. Equality of files is decided by content hash;
//! sizes and timestamps are informational.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::REPOSITORY_KEY_LENGTH;
use crate::error::{Error, Result};

/// Compute the lowercase hex SHA-256 digest of a byte slice
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Entity: one tracked repository file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the repository root, `/`-separated
    pub path: String,
    /// File size in bytes
    pub size: u64,
    /// Hex SHA-256 of the file content
    pub content_hash: String,
    /// Best-effort last modification time
    pub modified_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Build a record by hashing the file content
    pub fn from_content(
        path: impl Into<String>,
        content: &[u8],
        modified_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            path: path.into(),
            size: content.len() as u64,
            content_hash: content_hash(content),
            modified_at,
        }
    }
}

/// Identity of a repository across runs.
///
/// The origin (URL or canonical local path) keys the version history; the
/// revision is recorded for information and does not split the history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RepositoryIdentity {
    /// Origin URL or canonical local path
    pub origin: String,
    /// Revision marker (commit id, tag) if the source knows one
    pub revision: Option<String>,
}

impl RepositoryIdentity {
    /// Create an identity without a revision marker
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            revision: None,
        }
    }

    /// Attach a revision marker
    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    /// Stable storage key derived from the origin only
    pub fn storage_key(&self) -> String {
        let digest = content_hash(self.origin.as_bytes());
        digest[..REPOSITORY_KEY_LENGTH].to_string()
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(rev) => write!(f, "{}@{}", self.origin, rev),
            None => f.write_str(&self.origin),
        }
    }
}

/// Entity: content-addressed manifest of a repository
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    /// Repository this snapshot was captured from
    pub repository: RepositoryIdentity,
    /// Capture time
    pub captured_at: DateTime<Utc>,
    /// Files keyed by relative path, in path order
    pub files: BTreeMap<String, FileRecord>,
    /// Hash over the sorted (path, content hash) pairs
    pub content_hash: String,
}

impl Snapshot {
    /// Assemble a snapshot from captured records.
    ///
    /// Fails if two records share a path.
    pub fn new(
        repository: RepositoryIdentity,
        captured_at: DateTime<Utc>,
        records: impl IntoIterator<Item = FileRecord>,
    ) -> Result<Self> {
        let mut files = BTreeMap::new();
        for record in records {
            let path = record.path.clone();
            if files.insert(path.clone(), record).is_some() {
                return Err(Error::invalid_argument(format!(
                    "duplicate path in snapshot: {path}"
                )));
            }
        }
        let content_hash = Self::compute_content_hash(&files);
        Ok(Self {
            repository,
            captured_at,
            files,
            content_hash,
        })
    }

    /// Hash of the sorted (path, hash) pairs; independent of capture time
    pub fn compute_content_hash(files: &BTreeMap<String, FileRecord>) -> String {
        let mut hasher = Sha256::new();
        for (path, record) in files {
            hasher.update(path.as_bytes());
            hasher.update([0u8]);
            hasher.update(record.content_hash.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }

    /// Whether the stored content hash matches the file set
    pub fn verify(&self) -> bool {
        Self::compute_content_hash(&self.files) == self.content_hash
    }

    /// Whether two snapshots describe identical content
    pub fn same_content(&self, other: &Snapshot) -> bool {
        self.content_hash == other.content_hash
    }

    /// Whether the path is tracked
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Record for a path
    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.files.get(path)
    }

    /// Tracked paths in order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of tracked files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file is tracked
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all file sizes
    pub fn total_size(&self) -> u64 {
        self.files.values().map(|f| f.size).sum()
    }
}
