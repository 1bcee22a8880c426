//! # repowiki
//!
//! Versioned, incrementally maintained wikis for source repositories.
//!
//! A run snapshots the repository, diffs it against the latest stored wiki
//! version, regenerates only the pages whose source files changed and
//! commits the result as a new immutable version. Generated Mermaid
//! diagrams are validated and repaired within a bounded budget.
//!
//! ## Architecture
//!
//! - `domain` - entities, value objects, errors and port traits
//! - `application` - capture, diff, impact mapping, validation and the run use case
//! - `infrastructure` - configuration, logging and the composition root
//! - [`cli`] - the `repowiki` command line

/// Domain layer - core types and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use repowiki_domain::*;
}

/// Application layer - domain services and use cases
pub mod application {
    pub use repowiki_application::*;
}

/// Infrastructure layer - config, logging and wiring
pub mod infrastructure {
    pub use repowiki_infrastructure::*;
}

pub mod cli;

pub use domain::*;
