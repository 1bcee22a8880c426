//! Generation provider implementations
//!
//! | Provider | Feature | Description |
//! |----------|---------|-------------|
//! | [`OllamaGenerationProvider`] | `generation-ollama` | Local Ollama server, streamed NDJSON |

/// Ollama generation provider
#[cfg(feature = "generation-ollama")]
pub mod ollama;

#[cfg(feature = "generation-ollama")]
pub use ollama::OllamaGenerationProvider;
