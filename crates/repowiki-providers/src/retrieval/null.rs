//! Null retrieval provider
//!
//! Used when no retrieval backend is configured; pages are then generated
//! from the outline and file list alone.

use async_trait::async_trait;
use repowiki_domain::error::Result;
use repowiki_domain::ports::providers::RetrievalProvider;
use repowiki_domain::value_objects::Passage;

/// Retrieval provider returning no passages
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRetrievalProvider;

impl NullRetrievalProvider {
    /// Create the provider
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RetrievalProvider for NullRetrievalProvider {
    async fn retrieve(&self, _query: &str, _limit: usize) -> Result<Vec<Passage>> {
        Ok(Vec::new())
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}
