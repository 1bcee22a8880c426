//! Page impact report

use serde::{Deserialize, Serialize};

use crate::value_objects::diff::DiffResult;

/// Pages affected by a diff, presented to the caller before any generation.
///
/// Every list preserves the base version's page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactReport {
    /// The diff the report was computed from
    pub diff: DiffResult,
    /// Pages whose dependencies intersect the changed paths
    pub impacted: Vec<String>,
    /// Impacted pages whose every dependency was removed
    pub orphaned: Vec<String>,
    /// Pages with no dependencies; only a full regeneration touches them
    pub untracked: Vec<String>,
    /// Outline pages absent from the base version; always generated
    pub new_pages: Vec<String>,
    /// Base pages absent from a supplied outline; not carried forward
    pub removed_pages: Vec<String>,
    /// Set when there is no base version and every page must be generated
    pub first_run: bool,
}

impl ImpactReport {
    /// Whether the run would change anything in regenerate-impacted mode
    pub fn is_empty(&self) -> bool {
        !self.first_run
            && self.impacted.is_empty()
            && self.new_pages.is_empty()
            && self.removed_pages.is_empty()
    }

    /// Whether the page id is impacted
    pub fn is_impacted(&self, id: &str) -> bool {
        self.impacted.iter().any(|p| p == id)
    }

    /// Whether the page id is orphaned
    pub fn is_orphaned(&self, id: &str) -> bool {
        self.orphaned.iter().any(|p| p == id)
    }
}
