//! # repowiki Domain Layer
//!
//! Core types for incrementally generating and caching a repository wiki.
//! This crate has no filesystem, network or runtime dependencies; everything
//! that touches the outside world is expressed as a port trait in [`ports`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`entities`] | Snapshots, file records, wiki pages and wiki versions |
//! | [`value_objects`] | Diff results, impact reports, run decisions, store summaries |
//! | [`ports`] | Repository, generation, retrieval, diagram, store and lock contracts |
//! | [`error`] | Domain error type and `Result` alias |
//! | [`constants`] | Domain constants (repair budget, fence language) |

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use entities::*;
pub use error::{DiagramParseError, Error, Result};
pub use value_objects::*;
