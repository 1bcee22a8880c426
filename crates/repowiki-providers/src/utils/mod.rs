//! Provider Utilities
//!
//! Shared utilities used by provider implementations.

mod fs;
#[cfg(feature = "generation-ollama")]
mod http_response;
mod path_filter;

pub use fs::{read_json, sync_dir, write_durable};
#[cfg(feature = "generation-ollama")]
pub use http_response::HttpResponseUtils;
pub use path_filter::PathFilter;
