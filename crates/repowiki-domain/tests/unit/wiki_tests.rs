//! Unit tests for wiki page and version entities

use std::collections::BTreeSet;

use chrono::Utc;
use repowiki_domain::{
    DiagramBlock, DiagramStatus, Error, FileRecord, GenerationMetadata, RepositoryIdentity,
    RunMetadata, RunMode, Snapshot, WikiPage, WikiVersion,
};

fn identity() -> RepositoryIdentity {
    RepositoryIdentity::new("/work/project")
}

fn snapshot() -> Snapshot {
    Snapshot::new(
        identity(),
        Utc::now(),
        vec![
            FileRecord::from_content("src/lib.rs", b"pub fn a() {}", None),
            FileRecord::from_content("src/store.rs", b"pub struct Store;", None),
        ],
    )
    .expect("snapshot should assemble")
}

fn page(id: &str, deps: &[&str], status: DiagramStatus) -> WikiPage {
    let mut block = DiagramBlock::new(0, "flowchart TD\n  A --> B");
    block.status = status;
    WikiPage {
        id: id.to_string(),
        title: id.to_uppercase(),
        body: "body".to_string(),
        dependencies: deps.iter().map(|d| (*d).to_string()).collect(),
        diagrams: vec![block],
        metadata: GenerationMetadata {
            model: "test-model".to_string(),
            generated_at: Utc::now(),
            repair_attempts: 0,
            unresolved_errors: Vec::new(),
        },
    }
}

fn version(pages: Vec<WikiPage>) -> WikiVersion {
    let now = Utc::now();
    WikiVersion {
        repository: identity(),
        number: 1,
        previous: None,
        created_at: now,
        snapshot: snapshot(),
        pages,
        run: RunMetadata {
            mode: RunMode::RegenerateAll,
            model: "test-model".to_string(),
            regenerated: Vec::new(),
            copied: Vec::new(),
            dropped: Vec::new(),
            started_at: now,
            finished_at: now,
        },
    }
}

#[test]
fn test_valid_version_passes_validation() {
    let v = version(vec![
        page("overview", &["src/lib.rs"], DiagramStatus::Valid),
        page("storage", &["src/store.rs"], DiagramStatus::AcceptedWithErrors),
    ]);
    assert!(v.validate().is_ok());
    assert_eq!(v.page_ids().collect::<Vec<_>>(), vec!["overview", "storage"]);
    assert!(v.page("storage").is_some_and(WikiPage::has_diagram_errors));
}

#[test]
fn test_unvalidated_diagram_is_rejected() {
    let v = version(vec![page("overview", &["src/lib.rs"], DiagramStatus::Unvalidated)]);
    assert!(matches!(v.validate(), Err(Error::InvalidArgument { .. })));
}

#[test]
fn test_untracked_dependency_is_rejected() {
    let v = version(vec![page("overview", &["src/gone.rs"], DiagramStatus::Valid)]);
    match v.validate() {
        Err(Error::InvalidArgument { message }) => assert!(message.contains("src/gone.rs")),
        other => panic!("Expected InvalidArgument error, got {other:?}"),
    }
}

#[test]
fn test_duplicate_page_ids_are_rejected() {
    let v = version(vec![
        page("overview", &["src/lib.rs"], DiagramStatus::Valid),
        page("overview", &["src/store.rs"], DiagramStatus::Valid),
    ]);
    assert!(v.validate().is_err());
}

#[test]
fn test_previous_must_precede_number() {
    let mut v = version(vec![]);
    v.number = 2;
    v.previous = Some(2);
    assert!(v.validate().is_err());
    v.previous = Some(1);
    assert!(v.validate().is_ok());
}

#[test]
fn test_page_dependency_queries() {
    let p = page("overview", &["src/lib.rs", "src/gone.rs"], DiagramStatus::Valid);
    let changed: BTreeSet<String> = ["src/lib.rs".to_string()].into_iter().collect();
    assert!(p.depends_on_any(&changed));
    assert_eq!(p.missing_dependencies(&snapshot()), vec!["src/gone.rs"]);
}

#[test]
fn test_diagram_status_serializes_snake_case() {
    let json = serde_json::to_string(&DiagramStatus::AcceptedWithErrors)
        .expect("serialization should succeed");
    assert_eq!(json, "\"accepted_with_errors\"");
}
