//! Tests for the page impact mapper

use std::collections::BTreeSet;

use chrono::Utc;
use repowiki_application::map_impact;
use repowiki_domain::{DiffResult, GenerationMetadata, WikiPage};

fn page(id: &str, deps: &[&str]) -> WikiPage {
    WikiPage {
        id: id.to_string(),
        title: id.to_string(),
        body: String::new(),
        dependencies: deps.iter().map(|d| (*d).to_string()).collect(),
        diagrams: Vec::new(),
        metadata: GenerationMetadata {
            model: "m".to_string(),
            generated_at: Utc::now(),
            repair_attempts: 0,
            unresolved_errors: Vec::new(),
        },
    }
}

fn set(paths: &[&str]) -> BTreeSet<String> {
    paths.iter().map(|p| (*p).to_string()).collect()
}

fn pages() -> Vec<WikiPage> {
    vec![
        page("overview", &["README.md", "src/lib.rs"]),
        page("cli", &["src/cli.rs"]),
        page("storage", &["src/store.rs", "src/store/fs.rs"]),
        page("glossary", &[]),
    ]
}

#[test]
fn selects_only_pages_touching_changed_paths() {
    let diff = DiffResult {
        modified: set(&["src/store.rs"]),
        unchanged: set(&["README.md", "src/lib.rs", "src/cli.rs", "src/store/fs.rs"]),
        ..DiffResult::default()
    };
    let report = map_impact(&diff, Some(&pages()));

    assert_eq!(report.impacted, vec!["storage"]);
    assert!(report.orphaned.is_empty());
    assert_eq!(report.untracked, vec!["glossary"]);
    assert!(!report.first_run);
}

#[test]
fn never_selects_a_page_disjoint_from_the_change_set() {
    let diff = DiffResult {
        added: set(&["src/new.rs"]),
        removed: set(&["src/cli.rs"]),
        modified: set(&["README.md"]),
        ..DiffResult::default()
    };
    let changed = diff.changed();
    let all = pages();
    let report = map_impact(&diff, Some(&all));

    for id in &report.impacted {
        let page = all.iter().find(|p| &p.id == id).unwrap();
        assert!(page.dependencies.iter().any(|d| changed.contains(d)), "{id} selected without cause");
    }
    assert_eq!(report.impacted, vec!["overview", "cli"]);
}

#[test]
fn page_whose_dependencies_all_vanished_is_orphaned() {
    let diff = DiffResult {
        removed: set(&["src/cli.rs", "src/store.rs"]),
        unchanged: set(&["README.md", "src/lib.rs", "src/store/fs.rs"]),
        ..DiffResult::default()
    };
    let report = map_impact(&diff, Some(&pages()));

    assert_eq!(report.impacted, vec!["cli", "storage"]);
    assert_eq!(report.orphaned, vec!["cli"]);
    assert!(report.is_orphaned("cli"));
    assert!(!report.is_orphaned("storage"));
}

#[test]
fn no_base_pages_means_first_run() {
    let diff = DiffResult {
        added: set(&["a.rs"]),
        ..DiffResult::default()
    };
    let report = map_impact(&diff, None);
    assert!(report.first_run);
    assert!(report.impacted.is_empty());
}

#[test]
fn empty_diff_impacts_nothing() {
    let diff = DiffResult {
        unchanged: set(&["README.md", "src/lib.rs"]),
        ..DiffResult::default()
    };
    let report = map_impact(&diff, Some(&pages()));
    assert!(report.impacted.is_empty());
    assert!(report.orphaned.is_empty());
}
