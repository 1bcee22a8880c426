//! Prompt construction
//!
//! Builds the text sent to the generation port for new pages and for repair
//! rounds. Wording is intentionally plain; providers may wrap it further.

use std::fmt::Write as _;

use repowiki_domain::constants::DIAGRAM_FENCE_LANGUAGE;
use repowiki_domain::value_objects::{DiagramFailure, Passage};
use repowiki_domain::{PageOutline, RepositoryIdentity};

/// Prompt for a new page
pub fn page_prompt(
    page: &PageOutline,
    repository: &RepositoryIdentity,
    passages: &[Passage],
    language: &str,
) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Write the wiki page \"{}\" for the repository {}.",
        page.title, repository.origin
    );
    if !page.description.is_empty() {
        let _ = writeln!(prompt, "The page covers: {}", page.description);
    }
    let _ = writeln!(prompt, "Write in {language}, using Markdown.");
    let _ = writeln!(
        prompt,
        "Embed diagrams as fenced ```{DIAGRAM_FENCE_LANGUAGE} blocks."
    );

    if !page.dependencies.is_empty() {
        prompt.push_str("\nRelevant source files:\n");
        for dep in &page.dependencies {
            let _ = writeln!(prompt, "- {dep}");
        }
    }

    if !passages.is_empty() {
        prompt.push_str("\nRepository excerpts:\n");
        for passage in passages {
            let _ = writeln!(prompt, "--- {} ---\n{}", passage.path, passage.text);
        }
    }
    prompt
}

/// Prompt asking the generator to fix failing diagram blocks
pub fn repair_prompt(title: &str, body: &str, failures: &[DiagramFailure]) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "The wiki page \"{title}\" contains {} diagram block(s) that do not parse.",
        failures.len()
    );
    prompt.push_str(
        "Return the complete page with every failing diagram corrected. \
         Keep all other content unchanged.\n",
    );
    for failure in failures {
        let _ = writeln!(
            prompt,
            "\nDiagram #{} failed with: {}\n```{DIAGRAM_FENCE_LANGUAGE}\n{}\n```",
            failure.index + 1,
            failure.error,
            failure.source
        );
    }
    let _ = write!(prompt, "\nOriginal page:\n{body}");
    prompt
}
