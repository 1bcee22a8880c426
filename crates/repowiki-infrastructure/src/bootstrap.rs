//! Composition root
//!
//! Wires configured providers into the application use cases.
//!
//! ```text
//! AppConfig → AppContext ─┬─ FilesystemVersionStore ── WikiCacheService
//!                         └─ LocalRepositorySource
//!                            + OllamaGenerationProvider
//!                            + MermaidParser ──────────── WikiRunService
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let context = init_app(config).await?;
//! let source = context.open_repository("path/to/checkout")?;
//! let service = context.run_service(source)?;
//! let outcome = service
//!     .run_with_retry(context.run_request(), &RunDecision::regenerate_impacted())
//!     .await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use repowiki_application::{GenerationValidator, RunOptions, RunRequest, WikiCacheService, WikiRunService};
use repowiki_domain::RepositoryIdentity;
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::infrastructure::VersionStore;
use repowiki_domain::ports::providers::{GenerationProvider, RepositorySource};
use repowiki_providers::diagram::MermaidParser;
use repowiki_providers::generation::OllamaGenerationProvider;
use repowiki_providers::repository::LocalRepositorySource;
use repowiki_providers::retrieval::NullRetrievalProvider;
use repowiki_providers::store::FilesystemVersionStore;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error_ext::ErrorContext;

/// Application context holding configuration and the shared version store
pub struct AppContext {
    /// Application configuration
    pub config: Arc<AppConfig>,

    store: Arc<FilesystemVersionStore>,
}

/// Build the application context from configuration
///
/// Creates the store directory if needed.
pub async fn init_app(config: AppConfig) -> Result<AppContext> {
    let directory = config.cache.resolved_directory();
    tokio::fs::create_dir_all(&directory)
        .await
        .io_context(format!("Failed to create store directory {}", directory.display()))?;

    let store = FilesystemVersionStore::new(&directory).with_lock_timeout(config.cache.lock_timeout());
    info!(store = %directory.display(), "Version store ready");

    Ok(AppContext {
        config: Arc::new(config),
        store: Arc::new(store),
    })
}

impl AppContext {
    /// Shared version store
    pub fn store(&self) -> Arc<dyn VersionStore> {
        self.store.clone()
    }

    /// Version administration use case
    pub fn cache_service(&self) -> WikiCacheService {
        WikiCacheService::new(self.store())
    }

    /// Open a local checkout with the configured capture settings
    pub fn open_repository(&self, path: impl AsRef<Path>) -> Result<Arc<dyn RepositorySource>> {
        let repository = &self.config.repository;
        let source = LocalRepositorySource::open(path)?
            .with_hidden(repository.include_hidden)
            .with_max_file_size(repository.size_limit());
        debug!(root = %source.root().display(), "Repository opened");
        Ok(Arc::new(source))
    }

    /// Generation provider named by the configuration
    pub fn generation_provider(&self) -> Result<Arc<dyn GenerationProvider>> {
        let generation = &self.config.generation;
        match generation.provider.as_str() {
            "ollama" => {
                let client = reqwest::Client::builder()
                    .build()
                    .context("Failed to build HTTP client")?;
                Ok(Arc::new(OllamaGenerationProvider::new(
                    generation.base_url.clone(),
                    generation.model.clone(),
                    generation.timeout(),
                    client,
                )))
            }
            other => Err(Error::Configuration {
                message: format!("Unknown generation provider: {other}"),
                source: None,
            }),
        }
    }

    /// Run use case over `source` with the configured generation provider
    pub fn run_service(&self, source: Arc<dyn RepositorySource>) -> Result<WikiRunService> {
        self.run_service_with(source, self.generation_provider()?)
    }

    /// Run use case over `source` with an explicit generation provider
    pub fn run_service_with(
        &self,
        source: Arc<dyn RepositorySource>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Result<WikiRunService> {
        let generation = &self.config.generation;
        let validator = GenerationValidator::new(generator, Arc::new(MermaidParser::new()))?
            .with_max_repair_attempts(generation.max_repair_attempts)
            .with_language(generation.language.clone());

        let options = RunOptions {
            concurrency: generation.concurrency,
            capture_concurrency: self.config.repository.capture_concurrency,
            retrieval_passages: self.config.run.retrieval_passages,
            conflict_retries: self.config.run.conflict_retries,
        };

        Ok(WikiRunService::new(
            source,
            self.store(),
            Arc::new(NullRetrievalProvider::new()),
            validator,
            options,
        ))
    }

    /// Run request carrying the configured path filters
    pub fn run_request(&self) -> RunRequest {
        RunRequest::new(self.config.repository.filters())
    }

    /// Remove staging leftovers for `repository` when enabled
    pub async fn clean_staging(&self, repository: &RepositoryIdentity) -> Result<usize> {
        if !self.config.cache.clean_staging {
            return Ok(0);
        }
        self.store.clean_staging(repository).await
    }
}
