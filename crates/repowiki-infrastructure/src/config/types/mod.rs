//! Configuration types module

pub mod app;
pub mod cache;
pub mod generation;
pub mod logging;
pub mod repository;

// Re-export main types
pub use app::{AppConfig, RunConfig};
pub use cache::CacheConfig;
pub use generation::GenerationConfig;
pub use logging::LoggingConfig;
pub use repository::RepositoryConfig;
