//! Retrieval provider implementations

/// Retrieval provider that never returns passages
pub mod null;

pub use null::NullRetrievalProvider;
