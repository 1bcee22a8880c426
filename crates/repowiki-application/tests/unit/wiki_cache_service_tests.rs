//! Tests for the cache administration use case

use std::sync::Arc;

use repowiki_application::{
    RunRequest, WikiCacheService, WikiCacheServiceInterface, WikiRunServiceInterface,
};
use repowiki_domain::RunDecision;
use repowiki_domain::value_objects::PathFilters;
use repowiki_providers::store::InMemoryVersionStore;

use crate::test_utils::{
    BROKEN_DIAGRAM, ScriptedGenerator, five_file_source, harness, identity, outline, plain_body,
};

#[tokio::test]
async fn show_without_versions_is_not_found() {
    let cache = WikiCacheService::new(Arc::new(InMemoryVersionStore::new()));
    assert!(cache.show(&identity(), None).await.unwrap_err().is_not_found());
    assert!(cache.list_versions(&identity()).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_show_and_retire() {
    let h = harness(five_file_source(), ScriptedGenerator::plain());
    let request = RunRequest::new(PathFilters::all()).with_outline(outline());
    for revision in 0..3 {
        h.source.insert("README.md", format!("# Project {revision}"));
        h.service
            .run(request.clone(), &RunDecision::regenerate_impacted())
            .await
            .unwrap();
    }
    let cache = WikiCacheService::new(Arc::clone(&h.store) as _);

    assert_eq!(cache.show(&identity(), None).await.unwrap().number, 3);
    cache.retire(&identity(), 2).await.unwrap();

    let summaries = cache.list_versions(&identity()).await.unwrap();
    let numbers: Vec<(u64, bool)> = summaries.iter().map(|s| (s.number, s.retired)).collect();
    assert_eq!(numbers, vec![(1, false), (2, true), (3, false)]);
    assert!(cache.show(&identity(), Some(2)).await.unwrap_err().is_not_found());
    assert_eq!(cache.show(&identity(), Some(1)).await.unwrap().number, 1);
    assert!(cache.retire(&identity(), 4).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn diagram_report_lists_pages_accepted_with_errors() {
    let generator = ScriptedGenerator::new(|request, _| {
        if request.page_id == "cli" {
            Ok(format!("# CLI\n\n{BROKEN_DIAGRAM}\n"))
        } else {
            Ok(plain_body(&request.page_id))
        }
    });
    let h = harness(five_file_source(), generator);
    h.service
        .run(
            RunRequest::new(PathFilters::all()).with_outline(outline()),
            &RunDecision::regenerate_all(),
        )
        .await
        .unwrap();
    let cache = WikiCacheService::new(Arc::clone(&h.store) as _);

    let report = cache.diagram_report(&identity(), None).await.unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].page_id, "cli");
    assert!(report[0].errors[0].starts_with("diagram 1:"));
}
