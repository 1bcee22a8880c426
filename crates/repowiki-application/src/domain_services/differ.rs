//! Snapshot Differ
//!
//! Joins two manifests by path, then compares content hashes. A renamed
//! file shows up as one removal plus one addition.

use repowiki_domain::{DiffResult, Snapshot};

/// Classify every path of `base` and `current`.
///
/// Without a base every current path is added. The four result sets are
/// disjoint and together cover the union of both path sets.
pub fn diff_snapshots(base: Option<&Snapshot>, current: &Snapshot) -> DiffResult {
    let mut diff = DiffResult::default();

    let Some(base) = base else {
        diff.added = current.files.keys().cloned().collect();
        return diff;
    };

    for (path, record) in &current.files {
        match base.get(path) {
            None => {
                diff.added.insert(path.clone());
            }
            Some(previous) if previous.content_hash == record.content_hash => {
                diff.unchanged.insert(path.clone());
            }
            Some(_) => {
                diff.modified.insert(path.clone());
            }
        }
    }

    diff.removed = base
        .paths()
        .filter(|path| !current.contains(path))
        .map(str::to_string)
        .collect();

    diff
}
