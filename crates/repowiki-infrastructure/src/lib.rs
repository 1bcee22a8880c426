//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns that support the application and domain
//! layers.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | TOML + environment configuration through Figment |
//! | [`logging`] | Structured logging with tracing |
//! | [`bootstrap`] | Composition root wiring providers into use cases |
//! | [`error_ext`] | Context extension for foreign errors |
//! | [`constants`] | Configuration defaults |

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;

pub use bootstrap::{AppContext, init_app};
pub use config::{AppConfig, ConfigLoader};
pub use error_ext::ErrorContext;
