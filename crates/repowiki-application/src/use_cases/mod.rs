//! Use Cases
//!
//! | Use case | Description |
//! |----------|-------------|
//! | [`WikiRunService`] | Plans, generates and commits wiki versions |
//! | [`WikiCacheService`] | Lists, shows and retires stored versions |

/// Stored version administration
pub mod wiki_cache_service;
/// Generation run orchestration
pub mod wiki_run_service;

pub use wiki_cache_service::WikiCacheService;
pub use wiki_run_service::{RunOptions, WikiRunService};
