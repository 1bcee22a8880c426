//! Value Objects
//!
//! Immutable values exchanged between the orchestrator, the domain services
//! and the ports. None of them carries identity of its own.

/// Snapshot diff classification
pub mod diff;
/// Prompt inputs exchanged with the generation port
pub mod generation;
/// Impact report produced from a diff
pub mod impact;
/// Wiki outline used to seed the page set
pub mod outline;
/// Run modes and caller decisions
pub mod run;
/// Version store handles and summaries
pub mod store;

pub use diff::{ChangeKind, DiffResult};
pub use generation::{
    Diagram, DiagramFailure, GenerationRequest, Passage, PathFilters, RepairContext,
};
pub use impact::ImpactReport;
pub use outline::{PageOutline, WikiOutline};
pub use run::{RunDecision, RunMode};
pub use store::{VersionHandle, VersionSummary};
