//! Tests for the run orchestration use case

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use repowiki_application::{RunRequest, WikiRunServiceInterface};
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::infrastructure::{VersionStore, VersionSummaryStream};
use repowiki_domain::ports::providers::{GenerationProvider, RepositorySource, TextStream};
use repowiki_domain::value_objects::{GenerationRequest, PathFilters, VersionHandle};
use repowiki_domain::{
    ImpactReport, PageOutline, RepositoryIdentity, RunDecision, RunMode, WikiOutline, WikiVersion,
};
use repowiki_providers::store::InMemoryVersionStore;
use tokio_util::sync::CancellationToken;

use crate::test_utils::{
    BROKEN_DIAGRAM, ScriptedGenerator, five_file_source, harness, harness_with_store, identity,
    outline, plain_body, service_over,
};

fn first_run() -> RunRequest {
    RunRequest::new(PathFilters::all()).with_outline(outline())
}

fn sorted(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids
}

#[tokio::test]
async fn first_run_generates_every_page_as_version_one() {
    let h = harness(five_file_source(), ScriptedGenerator::plain());

    let plan = h.service.plan(first_run()).await.unwrap();
    assert_eq!(plan.snapshot.len(), 5);
    assert_eq!(plan.report.diff.added.len(), 5);
    assert!(plan.report.first_run);
    assert_eq!(plan.report.impacted.len(), 4);
    assert_eq!(plan.next_number, 1);
    assert!(plan.base.is_none());

    let outcome = h
        .service
        .execute(plan, RunDecision::regenerate_all())
        .await
        .unwrap();

    assert!(outcome.committed());
    assert_eq!(outcome.version.as_ref().unwrap().number, 1);
    assert_eq!(outcome.regenerated, vec!["overview", "cli", "storage", "glossary"]);
    assert!(outcome.copied.is_empty());

    let stored = h.store.latest(&identity()).await.unwrap().unwrap();
    assert_eq!(stored.number, 1);
    assert_eq!(stored.previous, None);
    assert_eq!(stored.snapshot.len(), 5);
    let order: Vec<&str> = stored.page_ids().collect();
    assert_eq!(order, vec!["overview", "cli", "storage", "glossary"]);
    assert_eq!(stored.page("cli").unwrap().body, plain_body("cli"));
}

#[tokio::test]
async fn first_run_without_outline_is_rejected() {
    let h = harness(five_file_source(), ScriptedGenerator::plain());
    let err = h
        .service
        .plan(RunRequest::new(PathFilters::all()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[tokio::test]
async fn modified_file_regenerates_only_dependent_pages() {
    let h = harness(five_file_source(), ScriptedGenerator::plain());
    h.service
        .run(first_run(), &RunDecision::regenerate_all())
        .await
        .unwrap();
    let v1 = h.store.get(&identity(), 1).await.unwrap();
    let calls_after_first = h.generator.call_count();

    h.source.insert("src/cli.rs", "pub fn main() { run(); }");
    let plan = h
        .service
        .plan(RunRequest::new(PathFilters::all()))
        .await
        .unwrap();
    assert_eq!(
        plan.report.diff.modified.iter().collect::<Vec<_>>(),
        vec!["src/cli.rs"]
    );
    assert!(plan.report.diff.added.is_empty());
    assert!(plan.report.diff.removed.is_empty());
    assert_eq!(plan.report.impacted, vec!["cli"]);
    assert_eq!(plan.next_number, 2);

    let outcome = h
        .service
        .execute(plan, RunDecision::regenerate_impacted())
        .await
        .unwrap();
    assert_eq!(outcome.regenerated, vec!["cli"]);
    assert_eq!(sorted(outcome.copied.clone()), vec!["glossary", "overview", "storage"]);
    assert_eq!(h.generator.call_count(), calls_after_first + 1);

    let v2 = h.store.get(&identity(), 2).await.unwrap();
    assert_eq!(v2.previous, Some(1));
    for id in ["overview", "storage", "glossary"] {
        assert_eq!(v2.page(id), v1.page(id), "{id} must be copied unchanged");
    }
    assert_ne!(
        v2.page("cli").unwrap().metadata.generated_at,
        v1.page("cli").unwrap().metadata.generated_at
    );
    assert_eq!(v2.run.mode, RunMode::RegenerateImpacted);
}

#[tokio::test]
async fn regenerate_all_ignores_the_impact_set() {
    let h = harness(five_file_source(), ScriptedGenerator::plain());
    h.service
        .run(first_run(), &RunDecision::regenerate_all())
        .await
        .unwrap();

    h.source.insert("README.md", "# Project v2");
    let outcome = h
        .service
        .run(RunRequest::new(PathFilters::all()), &RunDecision::regenerate_all())
        .await
        .unwrap();

    assert_eq!(outcome.regenerated.len(), 4);
    assert!(outcome.copied.is_empty());
    assert_eq!(h.generator.call_count(), 8);
}

#[tokio::test]
async fn abort_writes_nothing() {
    let h = harness(five_file_source(), ScriptedGenerator::plain());
    let outcome = h
        .service
        .run(first_run(), &RunDecision::abort())
        .await
        .unwrap();

    assert!(!outcome.committed());
    assert_eq!(outcome.mode, RunMode::Abort);
    assert_eq!(h.generator.call_count(), 0);
    assert_eq!(h.store.head_number(&identity()).await.unwrap(), 0);
}

#[tokio::test]
async fn generation_failure_leaves_the_store_untouched() {
    let generator = ScriptedGenerator::new(|request, _| {
        if request.page_id == "storage" {
            Err(Error::generation("model crashed"))
        } else {
            Ok(plain_body(&request.page_id))
        }
    });
    let h = harness(five_file_source(), generator);

    let err = h
        .service
        .run(first_run(), &RunDecision::regenerate_all())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Generation { .. }));
    assert!(h.store.latest(&identity()).await.unwrap().is_none());
    assert_eq!(h.store.head_number(&identity()).await.unwrap(), 0);
}

#[tokio::test]
async fn empty_repository_fails_before_anything_is_generated() {
    let h = harness(
        repowiki_providers::repository::InMemoryRepositorySource::new(identity()),
        ScriptedGenerator::plain(),
    );
    let err = h
        .service
        .run(first_run(), &RunDecision::regenerate_all())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Capture { .. }));
    assert_eq!(h.generator.call_count(), 0);
}

#[tokio::test]
async fn cancelled_request_does_not_capture() {
    let h = harness(five_file_source(), ScriptedGenerator::plain());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = h
        .service
        .run(first_run().with_cancel(cancel), &RunDecision::regenerate_all())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled { .. }));
}

/// Generator whose streams never finish
struct StallingGenerator;

#[async_trait]
impl GenerationProvider for StallingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<TextStream> {
        Ok(Box::pin(futures::stream::pending::<Result<String>>()))
    }

    fn model_name(&self) -> &str {
        "stalling"
    }

    fn provider_name(&self) -> &str {
        "stalling"
    }
}

/// Generator that answers earlier outline pages last and records the
/// highest number of overlapping calls
#[derive(Default)]
struct SlowFirstGenerator {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl GenerationProvider for SlowFirstGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<TextStream> {
        let delay = match request.page_id.as_str() {
            "overview" => 120,
            "cli" => 80,
            "storage" => 40,
            _ => 5,
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let body = plain_body(&request.page_id);
        Ok(Box::pin(futures::stream::iter(vec![Ok(body)])))
    }

    fn model_name(&self) -> &str {
        "slow-first"
    }

    fn provider_name(&self) -> &str {
        "slow-first"
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn page_order_follows_the_outline_not_completion() {
    let store = Arc::new(InMemoryVersionStore::new());
    let generator = Arc::new(SlowFirstGenerator::default());
    let service = service_over(
        Arc::new(five_file_source()) as Arc<dyn RepositorySource>,
        Arc::clone(&store) as Arc<dyn VersionStore>,
        Arc::clone(&generator) as Arc<dyn GenerationProvider>,
    );

    let outcome = service
        .run(first_run(), &RunDecision::regenerate_all())
        .await
        .unwrap();

    assert_eq!(outcome.regenerated, vec!["overview", "cli", "storage", "glossary"]);
    let stored = store.latest(&identity()).await.unwrap().unwrap();
    let order: Vec<&str> = stored.page_ids().collect();
    assert_eq!(order, vec!["overview", "cli", "storage", "glossary"]);
    // `service_over` runs two workers
    assert_eq!(generator.peak.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cancellation_during_generation_writes_nothing() {
    let store = Arc::new(InMemoryVersionStore::new());
    let service = service_over(
        Arc::new(five_file_source()) as Arc<dyn RepositorySource>,
        Arc::clone(&store) as Arc<dyn VersionStore>,
        Arc::new(StallingGenerator),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = service
        .run(first_run().with_cancel(cancel), &RunDecision::regenerate_all())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled { .. }));
    assert_eq!(store.head_number(&identity()).await.unwrap(), 0);
}

#[tokio::test]
async fn removed_dependency_orphans_and_drops_the_page() {
    let h = harness(five_file_source(), ScriptedGenerator::plain());
    h.service
        .run(first_run(), &RunDecision::regenerate_all())
        .await
        .unwrap();

    h.source.remove("src/cli.rs");
    let plan = h
        .service
        .plan(RunRequest::new(PathFilters::all()))
        .await
        .unwrap();
    assert_eq!(plan.report.orphaned, vec!["cli"]);

    let outcome = h
        .service
        .execute(plan, RunDecision::regenerate_impacted().dropping_orphans())
        .await
        .unwrap();
    assert_eq!(outcome.dropped, vec!["cli"]);
    assert!(outcome.regenerated.is_empty());

    let v2 = h.store.latest(&identity()).await.unwrap().unwrap();
    assert!(v2.page("cli").is_none());
    assert_eq!(v2.run.dropped, vec!["cli"]);
}

#[tokio::test]
async fn kept_orphan_is_regenerated_with_pruned_dependencies() {
    let h = harness(five_file_source(), ScriptedGenerator::plain());
    h.service
        .run(first_run(), &RunDecision::regenerate_all())
        .await
        .unwrap();

    h.source.remove("src/store/fs.rs");
    h.source.remove("src/cli.rs");
    let outcome = h
        .service
        .run(RunRequest::new(PathFilters::all()), &RunDecision::regenerate_impacted())
        .await
        .unwrap();

    assert_eq!(outcome.orphaned, vec!["cli"]);
    assert_eq!(outcome.regenerated, vec!["cli", "storage"]);
    let v2 = h.store.latest(&identity()).await.unwrap().unwrap();
    assert!(v2.page("cli").unwrap().dependencies.is_empty());
    assert_eq!(v2.page("storage").unwrap().dependencies, vec!["src/store.rs"]);
    v2.validate().unwrap();
}

#[tokio::test]
async fn outline_adds_and_removes_pages() {
    let h = harness(five_file_source(), ScriptedGenerator::plain());
    h.service
        .run(first_run(), &RunDecision::regenerate_all())
        .await
        .unwrap();

    let mut pages: Vec<PageOutline> = outline()
        .pages
        .into_iter()
        .filter(|p| p.id != "glossary")
        .collect();
    pages.push(PageOutline::new("faq", "FAQ").with_dependencies(["README.md", "src/gone.rs"]));
    let request = RunRequest::new(PathFilters::all()).with_outline(WikiOutline::new(pages));

    let plan = h.service.plan(request).await.unwrap();
    assert_eq!(plan.report.new_pages, vec!["faq"]);
    assert_eq!(plan.report.removed_pages, vec!["glossary"]);

    let outcome = h
        .service
        .execute(plan, RunDecision::regenerate_impacted())
        .await
        .unwrap();
    assert_eq!(outcome.regenerated, vec!["faq"]);
    assert_eq!(outcome.dropped, vec!["glossary"]);

    let v2 = h.store.latest(&identity()).await.unwrap().unwrap();
    let order: Vec<&str> = v2.page_ids().collect();
    assert_eq!(order, vec!["overview", "cli", "storage", "faq"]);
    assert_eq!(v2.page("faq").unwrap().dependencies, vec!["README.md"]);
}

#[tokio::test]
async fn pages_with_diagram_errors_are_reported() {
    let generator = ScriptedGenerator::new(|request, _| {
        if request.page_id == "storage" {
            Ok(format!("# Storage\n\n{BROKEN_DIAGRAM}\n"))
        } else {
            Ok(plain_body(&request.page_id))
        }
    });
    let h = harness(five_file_source(), generator);

    let outcome = h
        .service
        .run(first_run(), &RunDecision::regenerate_all())
        .await
        .unwrap();

    assert!(outcome.committed());
    assert_eq!(outcome.accepted_with_errors.len(), 1);
    let report = &outcome.accepted_with_errors[0];
    assert_eq!(report.page_id, "storage");
    assert_eq!(report.repair_attempts, 3);
    assert_eq!(report.errors.len(), 1);
}

#[tokio::test]
async fn decider_sees_the_impact_report() {
    struct AbortWhenUnchanged;

    impl repowiki_application::RunDecider for AbortWhenUnchanged {
        fn decide(&self, report: &ImpactReport) -> RunDecision {
            if report.diff.has_changes() {
                RunDecision::regenerate_impacted()
            } else {
                RunDecision::abort()
            }
        }
    }

    let h = harness(five_file_source(), ScriptedGenerator::plain());
    let first = h.service.run(first_run(), &AbortWhenUnchanged).await.unwrap();
    assert!(first.committed());

    let second = h
        .service
        .run(RunRequest::new(PathFilters::all()), &AbortWhenUnchanged)
        .await
        .unwrap();
    assert!(!second.committed());
    assert_eq!(h.store.head_number(&identity()).await.unwrap(), 1);
}

/// Store that reports a conflict on the first `create`
struct ConflictOnce {
    inner: InMemoryVersionStore,
    conflicted: AtomicBool,
}

#[async_trait]
impl VersionStore for ConflictOnce {
    async fn create(&self, version: &WikiVersion) -> Result<VersionHandle> {
        if !self.conflicted.swap(true, Ordering::SeqCst) {
            return Err(Error::conflict(
                version.repository.storage_key(),
                version.number,
                version.number,
            ));
        }
        self.inner.create(version).await
    }

    async fn latest(&self, repository: &RepositoryIdentity) -> Result<Option<WikiVersion>> {
        self.inner.latest(repository).await
    }

    async fn head_number(&self, repository: &RepositoryIdentity) -> Result<u64> {
        self.inner.head_number(repository).await
    }

    async fn get(&self, repository: &RepositoryIdentity, number: u64) -> Result<WikiVersion> {
        self.inner.get(repository, number).await
    }

    fn list<'a>(&'a self, repository: &'a RepositoryIdentity) -> VersionSummaryStream<'a> {
        self.inner.list(repository)
    }

    async fn retire(&self, repository: &RepositoryIdentity, number: u64) -> Result<()> {
        self.inner.retire(repository, number).await
    }

    fn store_name(&self) -> &str {
        "conflict-once"
    }
}

#[tokio::test]
async fn conflict_is_retried_as_a_whole_run() {
    let store = Arc::new(ConflictOnce {
        inner: InMemoryVersionStore::new(),
        conflicted: AtomicBool::new(false),
    });
    let generator = Arc::new(ScriptedGenerator::plain());
    let service = service_over(
        Arc::new(five_file_source()) as Arc<dyn RepositorySource>,
        Arc::clone(&store) as Arc<dyn VersionStore>,
        Arc::clone(&generator) as Arc<dyn GenerationProvider>,
    );

    let outcome = service
        .run_with_retry(first_run(), &RunDecision::regenerate_all())
        .await
        .unwrap();

    assert_eq!(outcome.version.unwrap().number, 1);
    assert_eq!(generator.call_count(), 8);
}

#[tokio::test]
async fn conflict_without_retry_is_returned() {
    let store = Arc::new(InMemoryVersionStore::new());
    let h = harness_with_store(five_file_source(), ScriptedGenerator::plain(), Arc::clone(&store));

    let plan = h.service.plan(first_run()).await.unwrap();
    // Another writer publishes version 1 in between
    let rival = harness_with_store(five_file_source(), ScriptedGenerator::plain(), store);
    rival
        .service
        .run(first_run(), &RunDecision::regenerate_all())
        .await
        .unwrap();

    let err = h
        .service
        .execute(plan, RunDecision::regenerate_all())
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(h.store.head_number(&identity()).await.unwrap(), 1);
}
