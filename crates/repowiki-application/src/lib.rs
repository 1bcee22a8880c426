//! Application Layer - repowiki
//!
//! Use cases and domain services that turn a repository into a versioned,
//! incrementally maintained wiki.
//!
//! ## Architecture
//!
//! The application layer:
//! - Captures repository snapshots through the `RepositorySource` port
//! - Diffs snapshots and maps changes to the pages they affect
//! - Drives the bounded validate-and-repair loop for generated pages
//! - Orchestrates runs and commits new versions through the `VersionStore` port
//!
//! ## Use Cases
//!
//! - [`WikiRunService`]: plan, decide and execute a generation run
//! - [`WikiCacheService`]: list, inspect and retire stored versions
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `repowiki-domain`: entities, value objects and port traits
//! - Pure Rust libraries for async, regex and time handling

pub mod domain_services;
pub mod ports;
pub mod use_cases;

pub use domain_services::*;
pub use ports::*;
pub use use_cases::*;
