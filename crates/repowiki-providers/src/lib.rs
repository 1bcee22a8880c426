//! # repowiki - Provider Implementations
//!
//! Concrete implementations of the ports defined in `repowiki-domain`.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Repository | `RepositorySource` | Local (git-aware walk), InMemory |
//! | Version store | `VersionStore` | Filesystem (staged atomic publish), InMemory |
//! | Lock | `LockProvider` | File (create-new lock files) |
//! | Diagram | `DiagramParser` | Mermaid structural parser |
//! | Generation | `GenerationProvider` | Ollama (streaming NDJSON) |
//! | Retrieval | `RetrievalProvider` | Null |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! repowiki-providers = { version = "0.1", default-features = false }
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use repowiki_providers::repository::LocalRepositorySource;
//! use repowiki_providers::store::FilesystemVersionStore;
//! use repowiki_providers::diagram::MermaidParser;
//! ```

// Re-export repowiki-domain types commonly used with providers
pub use repowiki_domain::error::{Error, Result};
pub use repowiki_domain::ports::{
    DiagramParser, GenerationProvider, LockProvider, RepositorySource, RetrievalProvider,
    VersionStore,
};

/// Provider-specific constants
pub mod constants;

/// Shared utilities for provider implementations
pub mod utils;

/// Repository source implementations
pub mod repository;

/// Version store implementations
pub mod store;

/// Advisory lock implementations
pub mod lock;

/// Diagram parser implementations
pub mod diagram;

/// Generation provider implementations
pub mod generation;

/// Retrieval provider implementations
pub mod retrieval;
