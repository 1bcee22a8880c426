//! Generation Validator
//!
//! Generates one page and drives its bounded validate-and-repair loop:
//!
//! ```text
//! Generated -> Validating -> Sealed
//!                  |   ^
//!                  v   |
//!               Repairing --(budget used)--> Sealed
//! ```
//!
//! Parse failures never escape this module. They either get repaired or end
//! up as "accepted with errors" in the page metadata. Generation errors are
//! fatal for the initial generation and count as a failed attempt inside the
//! repair loop.

use std::sync::Arc;

use chrono::Utc;
use regex::Regex;
use repowiki_domain::constants::MAX_REPAIR_ATTEMPTS;
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::providers::{DiagramParser, GenerationProvider, collect_text};
use repowiki_domain::value_objects::{
    DiagramFailure, GenerationRequest, Passage, RepairContext,
};
use repowiki_domain::{
    DiagramBlock, DiagramStatus, GenerationMetadata, PageOutline, RepositoryIdentity, WikiPage,
};
use tracing::{debug, trace, warn};

use super::prompt::{page_prompt, repair_prompt};

/// Per-page validation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    /// Body produced, not yet inspected
    Generated,
    /// Extracting and parsing diagram blocks
    Validating,
    /// Waiting for the generator to return a corrected body
    Repairing,
    /// Terminal; every block is valid or accepted with errors
    Sealed,
}

/// Everything needed to generate one page
#[derive(Debug, Clone)]
pub struct PageDraft {
    /// Page structure with dependencies already pruned to the snapshot
    pub outline: PageOutline,
    /// Repository the page describes
    pub repository: RepositoryIdentity,
    /// Grounding passages from the retrieval port
    pub passages: Vec<Passage>,
}

/// Generates pages and validates their embedded diagrams
pub struct GenerationValidator {
    generator: Arc<dyn GenerationProvider>,
    parser: Arc<dyn DiagramParser>,
    fence: Regex,
    max_repair_attempts: u32,
    language: String,
}

impl GenerationValidator {
    /// Create a validator for the parser's fence language
    pub fn new(
        generator: Arc<dyn GenerationProvider>,
        parser: Arc<dyn DiagramParser>,
    ) -> Result<Self> {
        let pattern = format!(
            r"(?ms)^```{}[ \t]*\r?\n(.*?)^```[ \t]*\r?$",
            regex::escape(parser.language())
        );
        let fence = Regex::new(&pattern)
            .map_err(|e| Error::internal(format!("invalid diagram fence pattern: {e}")))?;
        Ok(Self {
            generator,
            parser,
            fence,
            max_repair_attempts: MAX_REPAIR_ATTEMPTS,
            language: "English".to_string(),
        })
    }

    /// Override the repair budget (capped at `MAX_REPAIR_ATTEMPTS`)
    #[must_use]
    pub fn with_max_repair_attempts(mut self, attempts: u32) -> Self {
        self.max_repair_attempts = attempts.min(MAX_REPAIR_ATTEMPTS);
        self
    }

    /// Natural language the pages are written in
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Model recorded in page metadata
    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Generate a page and seal it.
    ///
    /// Fails only if the initial generation fails.
    pub async fn generate_page(&self, draft: &PageDraft) -> Result<WikiPage> {
        let request = GenerationRequest {
            page_id: draft.outline.id.clone(),
            prompt: page_prompt(
                &draft.outline,
                &draft.repository,
                &draft.passages,
                &self.language,
            ),
            passages: draft.passages.clone(),
            repair: None,
        };

        debug!(page = %draft.outline.id, "Generating page");
        let stream = self.generator.generate(&request).await?;
        let body = collect_text(stream).await?;
        Ok(self.seal(&draft.outline, body).await)
    }

    /// Run the validate-and-repair loop on a generated body
    pub async fn seal(&self, page: &PageOutline, mut body: String) -> WikiPage {
        let mut state = ValidationState::Generated;
        let mut blocks = Vec::new();
        let mut failures = Vec::new();
        let mut attempts = 0u32;

        loop {
            state = match state {
                ValidationState::Generated => ValidationState::Validating,
                ValidationState::Validating => {
                    blocks = self.extract_blocks(&body);
                    failures = self.validate_blocks(&mut blocks);
                    if failures.is_empty() || attempts >= self.max_repair_attempts {
                        ValidationState::Sealed
                    } else {
                        ValidationState::Repairing
                    }
                }
                ValidationState::Repairing => {
                    attempts += 1;
                    match self.repair(page, &body, &failures, attempts).await {
                        Ok(repaired) => {
                            body = repaired;
                            ValidationState::Validating
                        }
                        Err(e) => {
                            warn!(page = %page.id, attempt = attempts, error = %e, "Repair attempt failed");
                            if attempts >= self.max_repair_attempts {
                                ValidationState::Sealed
                            } else {
                                ValidationState::Repairing
                            }
                        }
                    }
                }
                ValidationState::Sealed => break,
            };
            trace!(page = %page.id, ?state, "Validation transition");
        }

        for block in &mut blocks {
            if block.status == DiagramStatus::Unvalidated {
                block.status = DiagramStatus::AcceptedWithErrors;
            }
        }
        let unresolved_errors: Vec<String> = failures
            .iter()
            .map(|f| format!("diagram {}: {}", f.index + 1, f.error))
            .collect();
        if !unresolved_errors.is_empty() {
            warn!(
                page = %page.id,
                attempts,
                unresolved = unresolved_errors.len(),
                "Page accepted with diagram errors"
            );
        }

        WikiPage {
            id: page.id.clone(),
            title: page.title.clone(),
            body,
            dependencies: page.dependencies.clone(),
            diagrams: blocks,
            metadata: GenerationMetadata {
                model: self.generator.model_name().to_string(),
                generated_at: Utc::now(),
                repair_attempts: attempts,
                unresolved_errors,
            },
        }
    }

    /// Extract every fenced diagram block of the body, in order
    pub fn extract_blocks(&self, body: &str) -> Vec<DiagramBlock> {
        self.fence
            .captures_iter(body)
            .enumerate()
            .map(|(index, caps)| {
                let source = caps.get(1).map_or("", |m| m.as_str());
                DiagramBlock::new(index, source.trim_end())
            })
            .collect()
    }

    /// Parse each block, marking valid ones and collecting failures
    fn validate_blocks(&self, blocks: &mut [DiagramBlock]) -> Vec<DiagramFailure> {
        let mut failures = Vec::new();
        for block in blocks.iter_mut() {
            match self.parser.parse(&block.source) {
                Ok(_) => {
                    block.status = DiagramStatus::Valid;
                    block.error = None;
                }
                Err(e) => {
                    block.error = Some(e.to_string());
                    failures.push(DiagramFailure {
                        index: block.index,
                        source: block.source.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        failures
    }

    async fn repair(
        &self,
        page: &PageOutline,
        body: &str,
        failures: &[DiagramFailure],
        attempt: u32,
    ) -> Result<String> {
        debug!(page = %page.id, attempt, failing = failures.len(), "Requesting diagram repair");
        let request = GenerationRequest {
            page_id: page.id.clone(),
            prompt: repair_prompt(&page.title, body, failures),
            passages: Vec::new(),
            repair: Some(RepairContext {
                attempt,
                original_body: body.to_string(),
                failures: failures.to_vec(),
            }),
        };
        let stream = self.generator.generate(&request).await?;
        let repaired = collect_text(stream).await?;
        if repaired.trim().is_empty() {
            return Err(Error::generation("repair returned an empty page"));
        }
        Ok(repaired)
    }
}
