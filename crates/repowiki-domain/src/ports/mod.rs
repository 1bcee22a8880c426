//! Domain Port Interfaces
//!
//! Boundary contracts between the domain and the outside world. The
//! application layer depends only on these traits; providers implement them.
//!
//! ## Organization
//!
//! - **providers/** - External collaborators (repository source, generation,
//!   retrieval, diagram parsing)
//! - **infrastructure/** - Persistence and coordination (version store, locks)

/// Persistence and coordination ports
pub mod infrastructure;
/// External collaborator ports
pub mod providers;

pub use infrastructure::{LockGuard, LockProvider, VersionStore, VersionSummaryStream};
pub use providers::{
    DiagramParser, GenerationProvider, RepositorySource, RetrievalProvider, SourceEntry,
    TextStream, collect_text,
};
