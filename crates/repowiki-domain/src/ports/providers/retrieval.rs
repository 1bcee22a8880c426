//! Retrieval Provider Port

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::Passage;

/// Retrieval Provider Interface
///
/// Returns passages ranked by relevance, best first. Ranking is entirely up
/// to the implementation.
#[async_trait]
pub trait RetrievalProvider: Send + Sync {
    /// Retrieve at most `limit` passages for a query
    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<Passage>>;

    /// Short name of the provider implementation
    fn provider_name(&self) -> &str;
}
