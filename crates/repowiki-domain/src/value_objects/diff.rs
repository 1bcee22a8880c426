//! Snapshot diff value objects

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Classification of a single path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Only in the current snapshot
    Added,
    /// Only in the base snapshot
    Removed,
    /// In both with differing hashes
    Modified,
    /// In both with equal hashes
    Unchanged,
}

/// Four disjoint path sets describing how a snapshot evolved.
///
/// Derived on demand, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Paths only in the current snapshot
    pub added: BTreeSet<String>,
    /// Paths only in the base snapshot
    pub removed: BTreeSet<String>,
    /// Paths in both with differing content hashes
    pub modified: BTreeSet<String>,
    /// Paths in both with equal content hashes
    pub unchanged: BTreeSet<String>,
}

impl DiffResult {
    /// Union of added, removed and modified paths
    pub fn changed(&self) -> BTreeSet<String> {
        self.added
            .iter()
            .chain(&self.removed)
            .chain(&self.modified)
            .cloned()
            .collect()
    }

    /// Whether anything differs between the two snapshots
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.modified.is_empty()
    }

    /// Number of changed paths
    pub fn total_changes(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    /// Classification of one path, if it appears in either snapshot
    pub fn classify(&self, path: &str) -> Option<ChangeKind> {
        if self.added.contains(path) {
            Some(ChangeKind::Added)
        } else if self.removed.contains(path) {
            Some(ChangeKind::Removed)
        } else if self.modified.contains(path) {
            Some(ChangeKind::Modified)
        } else if self.unchanged.contains(path) {
            Some(ChangeKind::Unchanged)
        } else {
            None
        }
    }
}
