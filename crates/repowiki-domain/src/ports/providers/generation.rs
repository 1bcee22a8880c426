//! Generation Provider Port
//!
//! Text generation is consumed as a finite, ordered stream of chunks. The
//! caller awaits the stream to completion before validating the result.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::error::Result;
use crate::value_objects::GenerationRequest;

/// Stream of generated text chunks; an `Err` item ends the generation
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Generation Provider Interface
///
/// Implementations receive both page requests and repair requests; a repair
/// request carries the failing diagram blocks and their parser errors in
/// [`GenerationRequest::repair`].
///
/// # Example
///
/// ```ignore
/// use repowiki_domain::ports::providers::{GenerationProvider, collect_text};
///
/// let stream = provider.generate(&request).await?;
/// let body = collect_text(stream).await?;
/// ```
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Start a generation and return its chunk stream
    async fn generate(&self, request: &GenerationRequest) -> Result<TextStream>;

    /// Model identifier recorded in page metadata
    fn model_name(&self) -> &str;

    /// Short name of the provider implementation (e.g. "ollama")
    fn provider_name(&self) -> &str;
}

/// Drain a chunk stream into one string, stopping at the first error
pub async fn collect_text(mut stream: TextStream) -> Result<String> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        text.push_str(&chunk?);
    }
    Ok(text)
}
