//! Tests for the generation validator and its repair loop

use std::sync::Arc;

use repowiki_application::{GenerationValidator, PageDraft};
use repowiki_domain::constants::MAX_REPAIR_ATTEMPTS;
use repowiki_domain::{DiagramStatus, PageOutline};
use repowiki_providers::diagram::MermaidParser;

use crate::test_utils::{BROKEN_DIAGRAM, ScriptedGenerator, VALID_DIAGRAM, identity};

fn two_diagrams(second: &str) -> String {
    format!("# Storage\n\nPipeline:\n\n{VALID_DIAGRAM}\n\nLayout:\n\n{second}\n\nDone.\n")
}

fn validator(generator: &Arc<ScriptedGenerator>) -> GenerationValidator {
    GenerationValidator::new(Arc::clone(generator) as _, Arc::new(MermaidParser::new())).unwrap()
}

fn draft() -> PageDraft {
    PageDraft {
        outline: PageOutline::new("storage", "Storage").with_dependencies(["src/store.rs"]),
        repository: identity(),
        passages: Vec::new(),
    }
}

fn leak(text: String) -> &'static str {
    Box::leak(text.into_boxed_str())
}

#[tokio::test]
async fn malformed_diagram_fixed_by_one_repair() {
    let broken = leak(two_diagrams(BROKEN_DIAGRAM));
    let fixed = leak(two_diagrams(VALID_DIAGRAM));
    let generator = Arc::new(ScriptedGenerator::sequence(vec![Ok(broken), Ok(fixed)]));

    let page = validator(&generator).generate_page(&draft()).await.unwrap();

    assert_eq!(page.diagrams.len(), 2);
    assert!(page.diagrams.iter().all(|d| d.status == DiagramStatus::Valid));
    assert_eq!(page.metadata.repair_attempts, 1);
    assert!(page.metadata.unresolved_errors.is_empty());
    assert_eq!(page.body, fixed);
    assert_eq!(page.dependencies, vec!["src/store.rs"]);

    let calls = generator.calls();
    assert_eq!(calls.len(), 2);
    let repair = calls[1].repair.as_ref().expect("second call is a repair");
    assert_eq!(repair.attempt, 1);
    assert_eq!(repair.original_body, broken);
    assert_eq!(repair.failures.len(), 1);
    assert_eq!(repair.failures[0].index, 1);
    assert!(repair.failures[0].error.contains("line"));
}

#[tokio::test]
async fn valid_page_needs_no_repair() {
    let body = leak(two_diagrams(VALID_DIAGRAM));
    let generator = Arc::new(ScriptedGenerator::sequence(vec![Ok(body)]));

    let page = validator(&generator).generate_page(&draft()).await.unwrap();

    assert_eq!(page.metadata.repair_attempts, 0);
    assert!(page.is_sealed());
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn permanently_broken_diagram_is_accepted_with_errors() {
    let broken = two_diagrams(BROKEN_DIAGRAM);
    let generator = Arc::new(ScriptedGenerator::new(move |_, _| Ok(broken.clone())));

    let page = validator(&generator).generate_page(&draft()).await.unwrap();

    assert_eq!(page.metadata.repair_attempts, MAX_REPAIR_ATTEMPTS);
    assert_eq!(generator.call_count(), 1 + MAX_REPAIR_ATTEMPTS as usize);
    assert_eq!(page.diagrams[0].status, DiagramStatus::Valid);
    assert_eq!(page.diagrams[1].status, DiagramStatus::AcceptedWithErrors);
    assert!(page.diagrams[1].error.is_some());
    assert_eq!(page.metadata.unresolved_errors.len(), 1);
    assert!(page.metadata.unresolved_errors[0].starts_with("diagram 2:"));
    assert!(page.has_diagram_errors());
    assert!(page.is_sealed());
}

#[tokio::test]
async fn repair_budget_cannot_exceed_the_maximum() {
    let broken = two_diagrams(BROKEN_DIAGRAM);
    let generator = Arc::new(ScriptedGenerator::new(move |_, _| Ok(broken.clone())));

    let page = validator(&generator)
        .with_max_repair_attempts(10)
        .generate_page(&draft())
        .await
        .unwrap();

    assert_eq!(page.metadata.repair_attempts, MAX_REPAIR_ATTEMPTS);
}

#[tokio::test]
async fn failed_repair_call_counts_as_an_attempt() {
    let broken = leak(two_diagrams(BROKEN_DIAGRAM));
    let fixed = leak(two_diagrams(VALID_DIAGRAM));
    let generator = Arc::new(ScriptedGenerator::sequence(vec![
        Ok(broken),
        Err("connection reset"),
        Ok("   \n"),
        Ok(fixed),
    ]));

    let page = validator(&generator).generate_page(&draft()).await.unwrap();

    assert_eq!(page.metadata.repair_attempts, 3);
    assert!(page.diagrams.iter().all(|d| d.status == DiagramStatus::Valid));
    assert_eq!(page.body, fixed);
}

#[tokio::test]
async fn zero_budget_seals_immediately() {
    let broken = leak(two_diagrams(BROKEN_DIAGRAM));
    let generator = Arc::new(ScriptedGenerator::sequence(vec![Ok(broken)]));

    let page = validator(&generator)
        .with_max_repair_attempts(0)
        .generate_page(&draft())
        .await
        .unwrap();

    assert_eq!(page.metadata.repair_attempts, 0);
    assert_eq!(page.diagrams[1].status, DiagramStatus::AcceptedWithErrors);
}

#[tokio::test]
async fn initial_generation_failure_is_fatal() {
    let generator = Arc::new(ScriptedGenerator::sequence(vec![Err("model not loaded")]));
    assert!(validator(&generator).generate_page(&draft()).await.is_err());
}

#[test]
fn extracts_only_diagram_fences_in_order() {
    let generator = Arc::new(ScriptedGenerator::plain());
    let body = format!(
        "intro\n\n```rust\nfn main() {{}}\n```\n\n{VALID_DIAGRAM}\n\n{BROKEN_DIAGRAM}\n"
    );

    let blocks = validator(&generator).extract_blocks(&body);

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].index, 0);
    assert!(blocks[0].source.starts_with("flowchart TD"));
    assert!(blocks[1].source.contains("C[Impact"));
    assert!(blocks.iter().all(|b| b.status == DiagramStatus::Unvalidated));
}
