//! Ollama Generation Provider
//!
//! Implements the GenerationProvider port against Ollama's `/api/generate`
//! endpoint with `"stream": true`. The server answers with newline-delimited
//! JSON objects; each carries a `response` text fragment and the last one
//! has `"done": true`.

use std::fmt::Display;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt, stream};
use reqwest::Client;
use serde::Deserialize;

use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::providers::{GenerationProvider, TextStream};
use repowiki_domain::value_objects::GenerationRequest;

use crate::constants::{CONTENT_TYPE_JSON, ERROR_MSG_REQUEST_TIMEOUT, OLLAMA_GENERATE_PATH};
use crate::utils::HttpResponseUtils;

/// Ollama generation provider
///
/// Receives HTTP client via constructor injection.
///
/// ## Example
///
/// ```rust,no_run
/// use repowiki_providers::generation::OllamaGenerationProvider;
/// use reqwest::Client;
/// use std::time::Duration;
///
/// fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = OllamaGenerationProvider::new(
///         "http://localhost:11434".to_string(),
///         "qwen2.5-coder:7b".to_string(),
///         Duration::from_secs(300),
///         Client::builder().build()?,
///     );
///     Ok(())
/// }
/// ```
pub struct OllamaGenerationProvider {
    base_url: String,
    model: String,
    timeout: Duration,
    http_client: Client,
}

impl OllamaGenerationProvider {
    /// Create a new Ollama generation provider
    ///
    /// # Arguments
    /// * `base_url` - Ollama server URL (e.g., "http://localhost:11434")
    /// * `model` - Model name (e.g., "qwen2.5-coder:7b")
    /// * `timeout` - Timeout for one request, streamed body included
    /// * `http_client` - Reqwest HTTP client for making API requests
    pub fn new(base_url: String, model: String, timeout: Duration, http_client: Client) -> Self {
        Self {
            base_url,
            model,
            timeout,
            http_client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{OLLAMA_GENERATE_PATH}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GenerationProvider for OllamaGenerationProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<TextStream> {
        let payload = serde_json::json!({
            "model": self.model,
            "prompt": request.prompt,
            "stream": true
        });

        let response = self
            .http_client
            .post(self.endpoint())
            .header("Content-Type", CONTENT_TYPE_JSON)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::generation(format!("{ERROR_MSG_REQUEST_TIMEOUT} {:?}", self.timeout))
                } else {
                    Error::generation_with_source("Ollama request failed", e)
                }
            })?;

        let response = HttpResponseUtils::check_status(response, "Ollama").await?;
        Ok(Box::pin(decode_ndjson(response.bytes_stream())))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

/// One line of the streamed response
#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

struct DecoderState<S> {
    inner: Pin<Box<S>>,
    buffer: Vec<u8>,
    exhausted: bool,
    finished: bool,
}

/// Turn a byte stream of NDJSON into a stream of text fragments
///
/// Ends after the `done` line. A transport error, an `error` line, a
/// malformed line or a body that ends without `done` yields one `Err` and
/// ends the stream.
fn decode_ndjson<S, B, E>(bytes: S) -> impl Stream<Item = Result<String>> + Send + 'static
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = DecoderState {
        inner: Box::pin(bytes),
        buffer: Vec::new(),
        exhausted: false,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.finished {
                return None;
            }

            if let Some(newline) = state.buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = state.buffer.drain(..=newline).collect();
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                match serde_json::from_slice::<GenerateChunk>(&line) {
                    Ok(GenerateChunk {
                        error: Some(message),
                        ..
                    }) => {
                        state.finished = true;
                        return Some((Err(Error::generation(format!("Ollama: {message}"))), state));
                    }
                    Ok(chunk) => {
                        state.finished = chunk.done;
                        if chunk.response.is_empty() {
                            continue;
                        }
                        return Some((Ok(chunk.response), state));
                    }
                    Err(e) => {
                        state.finished = true;
                        return Some((
                            Err(Error::generation_with_source("Malformed Ollama stream line", e)),
                            state,
                        ));
                    }
                }
            }

            if state.exhausted {
                state.finished = true;
                return Some((
                    Err(Error::generation("Ollama stream ended before completion")),
                    state,
                ));
            }

            match state.inner.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(Error::generation(format!("Ollama stream failed: {e}"))), state));
                }
                None => {
                    state.exhausted = true;
                    // Last line may lack its newline
                    if !state.buffer.iter().all(u8::is_ascii_whitespace) {
                        state.buffer.push(b'\n');
                    }
                }
            }
        }
    })
}
