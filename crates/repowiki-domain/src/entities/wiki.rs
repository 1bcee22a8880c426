//! Wiki Page and Version Entities
//!
//! Pages are mutable only inside the repair loop of the run that generated
//! them; once a version is assembled its pages are sealed and the version is
//! never mutated again.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::snapshot::{RepositoryIdentity, Snapshot};
use crate::error::{Error, Result};
use crate::value_objects::run::RunMode;

/// Validation status of one embedded diagram
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiagramStatus {
    /// Not validated yet; never persisted
    Unvalidated,
    /// Parsed without error
    Valid,
    /// Still failing after the repair budget was consumed
    AcceptedWithErrors,
}

impl DiagramStatus {
    /// Whether the status may appear in a persisted version
    pub fn is_sealed(self) -> bool {
        !matches!(self, Self::Unvalidated)
    }
}

/// A fenced diagram block found in a page body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Position of the block among the page's diagram blocks
    pub index: usize,
    /// Diagram source between the fences
    pub source: String,
    /// Validation status
    pub status: DiagramStatus,
    /// Parse error, when the block failed validation
    pub error: Option<String>,
}

impl DiagramBlock {
    /// Create an unvalidated block
    pub fn new(index: usize, source: impl Into<String>) -> Self {
        Self {
            index,
            source: source.into(),
            status: DiagramStatus::Unvalidated,
            error: None,
        }
    }
}

/// How a page came to have its current body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationMetadata {
    /// Model that produced the body
    pub model: String,
    /// When the body was produced
    pub generated_at: DateTime<Utc>,
    /// Repair rounds consumed (at most `MAX_REPAIR_ATTEMPTS`)
    pub repair_attempts: u32,
    /// Parse errors left unresolved when the page was accepted with errors
    pub unresolved_errors: Vec<String>,
}

/// Entity: one generated wiki page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WikiPage {
    /// Stable identifier, unique within a version
    pub id: String,
    /// Page title
    pub title: String,
    /// Markdown body
    pub body: String,
    /// Source files the page was generated from, in declaration order
    pub dependencies: Vec<String>,
    /// Diagram blocks embedded in the body
    pub diagrams: Vec<DiagramBlock>,
    /// Generation metadata
    pub metadata: GenerationMetadata,
}

impl WikiPage {
    /// Whether every diagram carries a persistable status
    pub fn is_sealed(&self) -> bool {
        self.diagrams.iter().all(|d| d.status.is_sealed())
    }

    /// Whether any diagram was accepted with errors
    pub fn has_diagram_errors(&self) -> bool {
        self.diagrams
            .iter()
            .any(|d| d.status == DiagramStatus::AcceptedWithErrors)
    }

    /// Whether the page depends on any of the given paths
    pub fn depends_on_any(&self, paths: &BTreeSet<String>) -> bool {
        self.dependencies.iter().any(|dep| paths.contains(dep))
    }

    /// Dependencies that are not tracked by the snapshot
    pub fn missing_dependencies<'a>(&'a self, snapshot: &Snapshot) -> Vec<&'a str> {
        self.dependencies
            .iter()
            .filter(|dep| !snapshot.contains(dep))
            .map(String::as_str)
            .collect()
    }
}

/// What a run did, recorded with the version it produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunMetadata {
    /// Mode chosen by the caller
    pub mode: RunMode,
    /// Model used for regenerated pages
    pub model: String,
    /// Pages generated during the run
    pub regenerated: Vec<String>,
    /// Pages copied forward unchanged
    pub copied: Vec<String>,
    /// Orphaned pages dropped on request
    pub dropped: Vec<String>,
    /// Run start time
    pub started_at: DateTime<Utc>,
    /// Run completion time (just before the version was created)
    pub finished_at: DateTime<Utc>,
}

/// Entity: immutable versioned bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WikiVersion {
    /// Repository the version belongs to
    pub repository: RepositoryIdentity,
    /// Version number, gap-free per repository starting at 1
    pub number: u64,
    /// Version this one was derived from, if any
    pub previous: Option<u64>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Snapshot the pages were generated against
    pub snapshot: Snapshot,
    /// Pages in their fixed order
    pub pages: Vec<WikiPage>,
    /// Run metadata
    pub run: RunMetadata,
}

impl WikiVersion {
    /// Look up a page by id
    pub fn page(&self, id: &str) -> Option<&WikiPage> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Page ids in order
    pub fn page_ids(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.id.as_str())
    }

    /// Check the invariants a version must hold before it is persisted.
    ///
    /// Page ids are unique, every dependency is tracked by the snapshot, no
    /// diagram is unvalidated and the previous pointer precedes the number.
    pub fn validate(&self) -> Result<()> {
        if self.number == 0 {
            return Err(Error::invalid_argument("version numbers start at 1"));
        }
        if let Some(previous) = self.previous
            && previous >= self.number
        {
            return Err(Error::invalid_argument(format!(
                "version {} cannot derive from version {previous}",
                self.number
            )));
        }
        if self.snapshot.repository.storage_key() != self.repository.storage_key() {
            return Err(Error::invalid_argument(
                "snapshot belongs to a different repository",
            ));
        }

        let mut seen = HashSet::new();
        for page in &self.pages {
            if !seen.insert(page.id.as_str()) {
                return Err(Error::invalid_argument(format!(
                    "duplicate page id: {}",
                    page.id
                )));
            }
            let missing = page.missing_dependencies(&self.snapshot);
            if !missing.is_empty() {
                return Err(Error::invalid_argument(format!(
                    "page {} references untracked paths: {}",
                    page.id,
                    missing.join(", ")
                )));
            }
            if !page.is_sealed() {
                return Err(Error::invalid_argument(format!(
                    "page {} has unvalidated diagrams",
                    page.id
                )));
            }
        }
        Ok(())
    }
}
