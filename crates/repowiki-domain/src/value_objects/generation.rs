//! Values exchanged with the repository, retrieval, generation and diagram
//! ports

use serde::{Deserialize, Serialize};

/// Include/exclude glob patterns passed through to a repository source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathFilters {
    /// Only paths matching one of these globs are tracked (all when empty)
    #[serde(default)]
    pub include: Vec<String>,
    /// Paths matching any of these globs are skipped
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl PathFilters {
    /// Filters that track every path
    pub fn all() -> Self {
        Self::default()
    }
}

/// A ranked text passage returned by the retrieval port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Source path the passage was taken from
    pub path: String,
    /// Passage text
    pub text: String,
    /// Relevance score; higher ranks first
    pub score: f32,
}

/// One diagram block that failed to parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramFailure {
    /// Position among the page's diagram blocks
    pub index: usize,
    /// Diagram source
    pub source: String,
    /// Parser message
    pub error: String,
}

/// Repair instructions attached to a generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairContext {
    /// Repair round, starting at 1
    pub attempt: u32,
    /// Page body that failed validation
    pub original_body: String,
    /// Every failing block with its parser error
    pub failures: Vec<DiagramFailure>,
}

/// Request sent to the generation port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Page being generated or repaired
    pub page_id: String,
    /// Full prompt text
    pub prompt: String,
    /// Grounding passages included in the prompt
    pub passages: Vec<Passage>,
    /// Present on repair requests
    pub repair: Option<RepairContext>,
}

impl GenerationRequest {
    /// Whether this request asks for a repair
    pub fn is_repair(&self) -> bool {
        self.repair.is_some()
    }
}

/// Structural summary of a parsed diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    /// Diagram kind from the header (`flowchart`, `sequenceDiagram`, ...)
    pub kind: String,
    /// Number of non-empty statements after the header
    pub statement_count: usize,
}
