//! Configuration loader
//!
//! Handles loading configuration from TOML files, environment variables
//! and default values.

use std::env;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use repowiki_domain::error::{Error, Result};
use repowiki_providers::utils::PathFilter;

use crate::config::AppConfig;
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    #[must_use]
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (explicit path, or the first default location found)
    /// 3. Environment variables with prefix (e.g., `REPOWIKI_GENERATION__MODEL`)
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        match &self.config_path {
            // An explicit path that does not exist is an error
            Some(config_path) => {
                if !config_path.exists() {
                    log_config_loaded(config_path, false);
                    return Err(Error::Configuration {
                        message: format!("Configuration file not found: {}", config_path.display()),
                        source: None,
                    });
                }
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            }
            None => {
                if let Some(default_path) = Self::find_default_config_path() {
                    figment = figment.merge(Toml::file(&default_path));
                    log_config_loaded(&default_path, true);
                }
            }
        }

        figment = figment.merge(
            Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR),
        );

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;

        Ok(app_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).io_context(format!(
            "Failed to write config file {}",
            path.as_ref().display()
        ))?;

        Ok(())
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// First existing default configuration file
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(current_dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
            dirs::home_dir().map(|d| {
                d.join(format!(".{DEFAULT_CONFIG_DIR}"))
                    .join(DEFAULT_CONFIG_FILENAME)
            }),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

/// Validate application configuration
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    parse_log_level(&config.logging.level)?;
    validate_cache_config(config)?;
    validate_repository_config(config)?;
    validate_generation_config(config)?;
    Ok(())
}

fn invalid(message: impl Into<String>) -> Error {
    Error::Configuration {
        message: message.into(),
        source: None,
    }
}

fn validate_cache_config(config: &AppConfig) -> Result<()> {
    if config.cache.lock_timeout_secs == 0 {
        return Err(invalid("Lock timeout cannot be 0"));
    }
    Ok(())
}

fn validate_repository_config(config: &AppConfig) -> Result<()> {
    if config.repository.capture_concurrency == 0 {
        return Err(invalid("Capture concurrency cannot be 0"));
    }
    PathFilter::new(&config.repository.filters()).map_err(|e| Error::Configuration {
        message: format!("Invalid repository filters: {e}"),
        source: Some(Box::new(e)),
    })?;
    Ok(())
}

fn validate_generation_config(config: &AppConfig) -> Result<()> {
    let generation = &config.generation;
    if generation.concurrency == 0 {
        return Err(invalid("Generation concurrency cannot be 0"));
    }
    if generation.timeout_secs == 0 {
        return Err(invalid("Generation timeout cannot be 0"));
    }
    if generation.model.trim().is_empty() {
        return Err(invalid("Generation model cannot be empty"));
    }
    if generation.base_url.trim().is_empty() {
        return Err(invalid("Generation base URL cannot be empty"));
    }
    if generation.max_repair_attempts > repowiki_domain::constants::MAX_REPAIR_ATTEMPTS {
        return Err(invalid(format!(
            "At most {} repair attempts are allowed",
            repowiki_domain::constants::MAX_REPAIR_ATTEMPTS
        )));
    }
    Ok(())
}
