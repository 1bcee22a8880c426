//! Application Ports
//!
//! Service interfaces implemented by the use cases and consumed by the
//! binary. Domain ports (repository, generation, store) live in
//! `repowiki_domain::ports`.

/// Use case service interfaces and run values
pub mod services;

pub use services::{
    PageDiagramErrors, RunDecider, RunOutcome, RunPlan, RunRequest, WikiCacheServiceInterface,
    WikiRunServiceInterface,
};
