//! Wiki Run Service Use Case
//!
//! Orchestrates one generation run: capture, diff against the latest stored
//! version, map impact, let the caller decide, generate the selected pages
//! with bounded concurrency and commit the new version. Nothing touches the
//! store before the final `create`, so a failed or cancelled run leaves the
//! store as it was.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use repowiki_domain::constants::{DEFAULT_GENERATION_CONCURRENCY, DEFAULT_RETRIEVAL_PASSAGES};
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::infrastructure::VersionStore;
use repowiki_domain::ports::providers::{RepositorySource, RetrievalProvider};
use repowiki_domain::value_objects::Passage;
use repowiki_domain::{
    PageOutline, RepositoryIdentity, RunDecision, RunMetadata, RunMode, Snapshot, WikiOutline,
    WikiPage, WikiVersion,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain_services::{
    GenerationValidator, PageDraft, SnapshotCapture, diff_snapshots, map_impact,
};
use crate::ports::services::{
    PageDiagramErrors, RunDecider, RunOutcome, RunPlan, RunRequest, WikiRunServiceInterface,
};

/// Tunables of the run service
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pages generated concurrently
    pub concurrency: usize,
    /// Files read concurrently during capture
    pub capture_concurrency: usize,
    /// Passages requested per page; 0 disables retrieval
    pub retrieval_passages: usize,
    /// Extra whole-run attempts after a version conflict
    pub conflict_retries: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_GENERATION_CONCURRENCY,
            capture_concurrency: 16,
            retrieval_passages: DEFAULT_RETRIEVAL_PASSAGES,
            conflict_retries: 2,
        }
    }
}

/// Run service implementation
pub struct WikiRunService {
    capture: SnapshotCapture,
    store: Arc<dyn VersionStore>,
    retrieval: Arc<dyn RetrievalProvider>,
    validator: Arc<GenerationValidator>,
    options: RunOptions,
}

impl WikiRunService {
    /// Create the run service with injected collaborators
    pub fn new(
        source: Arc<dyn RepositorySource>,
        store: Arc<dyn VersionStore>,
        retrieval: Arc<dyn RetrievalProvider>,
        validator: GenerationValidator,
        options: RunOptions,
    ) -> Self {
        Self {
            capture: SnapshotCapture::new(source, options.capture_concurrency),
            store,
            retrieval,
            validator: Arc::new(validator),
            options,
        }
    }

    /// Page set of the new version, in its final order
    fn planned_pages(
        outline: Option<&WikiOutline>,
        base: Option<&WikiVersion>,
    ) -> Result<Vec<PageOutline>> {
        let pages = match (outline, base) {
            (Some(outline), _) => {
                if outline.is_empty() {
                    return Err(Error::invalid_argument("wiki outline has no pages"));
                }
                outline.pages.clone()
            }
            (None, Some(base)) => base.pages.iter().map(PageOutline::from).collect(),
            (None, None) => {
                return Err(Error::invalid_argument(
                    "the first run of a repository requires a wiki outline",
                ));
            }
        };

        let mut seen = HashSet::new();
        for page in &pages {
            if !seen.insert(page.id.as_str()) {
                return Err(Error::invalid_argument(format!(
                    "duplicate page id in outline: {}",
                    page.id
                )));
            }
        }
        Ok(pages)
    }

    /// Keep only dependencies tracked by the snapshot
    fn prune_dependencies(mut page: PageOutline, snapshot: &Snapshot) -> PageOutline {
        let before = page.dependencies.len();
        page.dependencies.retain(|dep| snapshot.contains(dep));
        if page.dependencies.len() != before {
            warn!(
                page = %page.id,
                pruned = before - page.dependencies.len(),
                "Pruned dependencies missing from the snapshot"
            );
        }
        page
    }

    /// Generate pages on bounded workers; results carry their slot index
    async fn generate_pages(
        &self,
        jobs: Vec<(usize, PageOutline)>,
        repository: &RepositoryIdentity,
        cancel: &CancellationToken,
    ) -> Result<Vec<(usize, WikiPage)>> {
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, outline) in jobs {
            let semaphore = Arc::clone(&semaphore);
            let validator = Arc::clone(&self.validator);
            let retrieval = Arc::clone(&self.retrieval);
            let repository = repository.clone();
            let cancel = cancel.clone();
            let limit = self.options.retrieval_passages;

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::internal(format!("generation pool closed: {e}")))?;
                let work = async move {
                    let passages = retrieve_passages(retrieval.as_ref(), &outline, limit).await;
                    let draft = PageDraft {
                        outline,
                        repository,
                        passages,
                    };
                    validator.generate_page(&draft).await
                };
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(Error::cancelled("run cancelled during generation")),
                    page = work => page.map(|page| (index, page)),
                }
            });
        }

        // Dropping the set on the first error aborts the remaining workers.
        let mut generated = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (index, page) =
                joined.map_err(|e| Error::internal(format!("generation worker failed: {e}")))??;
            debug!(page = %page.id, "Page sealed");
            generated.push((index, page));
        }
        Ok(generated)
    }
}

/// Ask the retrieval port for grounding passages; failures only lose grounding
async fn retrieve_passages(
    retrieval: &dyn RetrievalProvider,
    page: &PageOutline,
    limit: usize,
) -> Vec<Passage> {
    if limit == 0 {
        return Vec::new();
    }
    let query = format!("{} {}", page.title, page.description);
    match retrieval.retrieve(query.trim(), limit).await {
        Ok(passages) => passages,
        Err(e) => {
            warn!(page = %page.id, error = %e, "Retrieval failed, generating without passages");
            Vec::new()
        }
    }
}

#[async_trait]
impl WikiRunServiceInterface for WikiRunService {
    async fn plan(&self, request: RunRequest) -> Result<RunPlan> {
        if request.cancel.is_cancelled() {
            return Err(Error::cancelled("run cancelled before capture"));
        }
        let started_at = Utc::now();

        let snapshot = self.capture.capture(&request.filters).await?;
        let repository = snapshot.repository.clone();
        let base = self.store.latest(&repository).await?;
        let head = self.store.head_number(&repository).await?;

        let diff = diff_snapshots(base.as_ref().map(|v| &v.snapshot), &snapshot);
        let mut report = map_impact(&diff, base.as_ref().map(|v| v.pages.as_slice()));
        let pages = Self::planned_pages(request.outline.as_ref(), base.as_ref())?;

        match &base {
            None => {
                report.impacted = pages.iter().map(|p| p.id.clone()).collect();
            }
            Some(base) => {
                report.new_pages = pages
                    .iter()
                    .filter(|p| base.page(&p.id).is_none())
                    .map(|p| p.id.clone())
                    .collect();
                if request.outline.is_some() {
                    let planned: HashSet<&str> = pages.iter().map(|p| p.id.as_str()).collect();
                    report.removed_pages = base
                        .page_ids()
                        .filter(|id| !planned.contains(id))
                        .map(str::to_string)
                        .collect();
                }
            }
        }

        info!(
            repository = %repository,
            base = ?base.as_ref().map(|v| v.number),
            next = head + 1,
            added = diff.added.len(),
            removed = diff.removed.len(),
            modified = diff.modified.len(),
            impacted = report.impacted.len(),
            orphaned = report.orphaned.len(),
            "Planned run"
        );

        Ok(RunPlan {
            snapshot,
            base,
            report,
            pages,
            next_number: head + 1,
            started_at,
            cancel: request.cancel,
        })
    }

    async fn execute(&self, plan: RunPlan, decision: RunDecision) -> Result<RunOutcome> {
        let RunPlan {
            snapshot,
            base,
            report,
            pages,
            next_number,
            started_at,
            cancel,
        } = plan;
        let repository = snapshot.repository.clone();

        if decision.mode == RunMode::Abort {
            info!(repository = %repository, "Run aborted by caller");
            return Ok(RunOutcome {
                repository,
                mode: RunMode::Abort,
                version: None,
                regenerated: Vec::new(),
                copied: Vec::new(),
                dropped: Vec::new(),
                orphaned: report.orphaned,
                accepted_with_errors: Vec::new(),
            });
        }
        if cancel.is_cancelled() {
            return Err(Error::cancelled("run cancelled before generation"));
        }

        let mut slots: Vec<Option<WikiPage>> = Vec::with_capacity(pages.len());
        let mut jobs = Vec::new();
        let mut regenerated = Vec::new();
        let mut copied = Vec::new();
        let mut dropped = report.removed_pages.clone();

        for outline in pages {
            if decision.drop_orphans && report.is_orphaned(&outline.id) {
                dropped.push(outline.id);
                continue;
            }
            let base_page = base.as_ref().and_then(|b| b.page(&outline.id));
            match base_page {
                Some(page)
                    if decision.mode == RunMode::RegenerateImpacted
                        && !report.is_impacted(&outline.id) =>
                {
                    copied.push(page.id.clone());
                    slots.push(Some(page.clone()));
                }
                _ => {
                    regenerated.push(outline.id.clone());
                    jobs.push((slots.len(), Self::prune_dependencies(outline, &snapshot)));
                    slots.push(None);
                }
            }
        }

        info!(
            repository = %repository,
            mode = %decision.mode,
            regenerate = regenerated.len(),
            copy = copied.len(),
            drop = dropped.len(),
            "Executing run"
        );

        for (index, page) in self.generate_pages(jobs, &repository, &cancel).await? {
            slots[index] = Some(page);
        }
        let pages: Vec<WikiPage> = slots
            .into_iter()
            .collect::<Option<_>>()
            .ok_or_else(|| Error::internal("a selected page was not generated"))?;

        let accepted_with_errors = pages
            .iter()
            .filter(|p| p.has_diagram_errors() && regenerated.contains(&p.id))
            .map(|p| PageDiagramErrors {
                page_id: p.id.clone(),
                repair_attempts: p.metadata.repair_attempts,
                errors: p.metadata.unresolved_errors.clone(),
            })
            .collect();

        let finished_at = Utc::now();
        let version = WikiVersion {
            repository: repository.clone(),
            number: next_number,
            previous: base.as_ref().map(|b| b.number),
            created_at: finished_at,
            snapshot,
            pages,
            run: RunMetadata {
                mode: decision.mode,
                model: self.validator.model_name().to_string(),
                regenerated: regenerated.clone(),
                copied: copied.clone(),
                dropped: dropped.clone(),
                started_at,
                finished_at,
            },
        };
        version.validate()?;

        if cancel.is_cancelled() {
            return Err(Error::cancelled("run cancelled before commit"));
        }
        let handle = self.store.create(&version).await?;
        info!(
            repository = %repository,
            version = handle.number,
            pages = version.pages.len(),
            "Committed version"
        );

        Ok(RunOutcome {
            repository,
            mode: decision.mode,
            version: Some(handle),
            regenerated,
            copied,
            dropped,
            orphaned: report.orphaned,
            accepted_with_errors,
        })
    }

    async fn run(&self, request: RunRequest, decider: &dyn RunDecider) -> Result<RunOutcome> {
        let plan = self.plan(request).await?;
        let decision = decider.decide(&plan.report);
        self.execute(plan, decision).await
    }

    async fn run_with_retry(
        &self,
        request: RunRequest,
        decider: &dyn RunDecider,
    ) -> Result<RunOutcome> {
        let max_attempts = self.options.conflict_retries + 1;
        let mut attempt = 1;
        loop {
            match self.run(request.clone(), decider).await {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(attempt, error = %e, "Version conflict, rerunning");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
