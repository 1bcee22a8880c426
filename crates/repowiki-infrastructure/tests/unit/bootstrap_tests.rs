//! Composition Root Tests

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use repowiki_application::{WikiCacheServiceInterface, WikiRunServiceInterface};
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::infrastructure::VersionStore;
use repowiki_domain::ports::providers::{GenerationProvider, RepositorySource, TextStream};
use repowiki_domain::value_objects::GenerationRequest;
use repowiki_domain::{PageOutline, RunDecision, WikiOutline};
use repowiki_infrastructure::config::AppConfig;
use repowiki_infrastructure::init_app;
use tempfile::TempDir;

/// Answers every request with one fixed page body
struct FixedGenerator;

#[async_trait]
impl GenerationProvider for FixedGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<TextStream> {
        let chunks = vec![
            Ok("# Page\n\n".to_string()),
            Ok("```mermaid\nflowchart TD\n  A --> B\n```\n".to_string()),
        ];
        Ok(Box::pin(stream::iter(chunks)))
    }

    fn model_name(&self) -> &str {
        "fixed"
    }

    fn provider_name(&self) -> &str {
        "fixed"
    }
}

fn config_in(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.cache.directory = Some(dir.path().join("store"));
    config
}

fn checkout() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/main.rs"), "fn main() {}\n").unwrap();
    std::fs::write(dir.path().join("README.md"), "# Project\n").unwrap();
    dir
}

#[tokio::test]
async fn test_init_app_creates_store_directory() {
    let dir = TempDir::new().unwrap();
    let context = init_app(config_in(&dir)).await.unwrap();
    assert!(dir.path().join("store").is_dir());
    assert_eq!(context.store().store_name(), "filesystem");
}

#[tokio::test]
async fn test_unknown_generation_provider() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.generation.provider = "telepathy".to_string();
    let context = init_app(config).await.unwrap();

    let err = context.generation_provider().err().unwrap();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[tokio::test]
async fn test_ollama_provider_from_config() {
    let dir = TempDir::new().unwrap();
    let context = init_app(config_in(&dir)).await.unwrap();
    let provider = context.generation_provider().unwrap();
    assert_eq!(provider.provider_name(), "ollama");
    assert_eq!(provider.model_name(), context.config.generation.model);
}

#[tokio::test]
async fn test_run_and_list_through_context() {
    let dir = TempDir::new().unwrap();
    let repo = checkout();
    let context = init_app(config_in(&dir)).await.unwrap();

    let source = context.open_repository(repo.path()).unwrap();
    let repository = source.identity();
    assert_eq!(context.clean_staging(&repository).await.unwrap(), 0);

    let service = context
        .run_service_with(source, Arc::new(FixedGenerator))
        .unwrap();
    let outline = WikiOutline::new(vec![
        PageOutline::new("overview", "Overview").with_dependencies(["README.md"]),
        PageOutline::new("entry", "Entry point").with_dependencies(["src/main.rs"]),
    ]);
    let request = context.run_request().with_outline(outline);
    let outcome = service
        .run_with_retry(request, &RunDecision::regenerate_all())
        .await
        .unwrap();
    assert!(outcome.committed());
    assert_eq!(outcome.regenerated, vec!["overview", "entry"]);

    let cache = context.cache_service();
    let versions = cache.list_versions(&repository).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].page_count, 2);

    let shown = cache.show(&repository, None).await.unwrap();
    assert_eq!(shown.number, 1);
    assert!(shown.pages.iter().all(|page| page.is_sealed()));
}

#[tokio::test]
async fn test_excluded_paths_are_not_captured() {
    let dir = TempDir::new().unwrap();
    let repo = checkout();
    let mut config = config_in(&dir);
    config.repository.exclude = vec!["src/**".to_string()];
    let context = init_app(config).await.unwrap();

    let source = context.open_repository(repo.path()).unwrap();
    let service = context
        .run_service_with(source, Arc::new(FixedGenerator))
        .unwrap();
    let outline = WikiOutline::new(vec![
        PageOutline::new("entry", "Entry point").with_dependencies(["src/main.rs"]),
    ]);
    let plan = service
        .plan(context.run_request().with_outline(outline))
        .await
        .unwrap();

    assert!(!plan.snapshot.contains("src/main.rs"));
    assert!(plan.snapshot.contains("README.md"));
    assert!(plan.pages[0].dependencies.is_empty());
}
