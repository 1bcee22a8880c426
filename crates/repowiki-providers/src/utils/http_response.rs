//! HTTP Response Utilities
//!
//! Helper functions for processing HTTP responses from API providers.
//! These are shared utilities, not ports.

use repowiki_domain::error::{Error, Result};
use reqwest::Response;

/// Format error message for a generation provider
fn generation_error(provider: &str, context: &str, details: &str) -> Error {
    Error::generation(format!("{provider} {context}: {details}"))
}

/// Utilities for processing HTTP responses
pub struct HttpResponseUtils;

impl HttpResponseUtils {
    /// Pass a successful response through, map a failed one to an error
    ///
    /// # Arguments
    /// * `response` - The HTTP response to check
    /// * `provider_name` - Name of the provider for error messages
    pub async fn check_status(response: Response, provider_name: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let code = status.as_u16();

        Err(match code {
            401 => generation_error(provider_name, "authentication failed", &error_text),
            404 => generation_error(provider_name, "model or endpoint not found", &error_text),
            429 => generation_error(provider_name, "rate limit exceeded", &error_text),
            500..=599 => generation_error(
                provider_name,
                &format!("server error ({code})"),
                &error_text,
            ),
            _ => generation_error(
                provider_name,
                &format!("request failed ({code})"),
                &error_text,
            ),
        })
    }
}
