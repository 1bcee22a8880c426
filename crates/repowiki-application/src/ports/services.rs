//! Service interfaces
//!
//! A run is split in two phases so the caller can look at the impact report
//! before anything is generated: [`WikiRunServiceInterface::plan`] captures
//! and diffs, [`WikiRunServiceInterface::execute`] generates and commits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use repowiki_domain::error::Result;
use repowiki_domain::value_objects::{PathFilters, VersionHandle, VersionSummary};
use repowiki_domain::{
    ImpactReport, PageOutline, RepositoryIdentity, RunDecision, RunMode, Snapshot, WikiOutline,
    WikiVersion,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Input of one run
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Include/exclude globs passed to the repository source
    pub filters: PathFilters,
    /// Page structure; required on the first run, optional afterwards
    pub outline: Option<WikiOutline>,
    /// Cancels the run; nothing is written once it fires
    pub cancel: CancellationToken,
}

impl RunRequest {
    /// Request using the base version's page structure
    pub fn new(filters: PathFilters) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Supply a page structure
    #[must_use]
    pub fn with_outline(mut self, outline: WikiOutline) -> Self {
        self.outline = Some(outline);
        self
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Result of the planning phase
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Freshly captured snapshot
    pub snapshot: Snapshot,
    /// Latest non-retired version, if any
    pub base: Option<WikiVersion>,
    /// What changed and which pages it affects
    pub report: ImpactReport,
    /// Page set of the new version in its final order
    pub pages: Vec<PageOutline>,
    /// Number the new version will be created with
    pub next_number: u64,
    /// When planning started
    pub started_at: DateTime<Utc>,
    /// Cancellation token carried over from the request
    pub cancel: CancellationToken,
}

impl RunPlan {
    /// Repository the plan was made for
    pub fn repository(&self) -> &RepositoryIdentity {
        &self.snapshot.repository
    }
}

/// Diagram errors left on one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDiagramErrors {
    /// Page id
    pub page_id: String,
    /// Repair rounds consumed
    pub repair_attempts: u32,
    /// Unresolved parse errors
    pub errors: Vec<String>,
}

/// Report of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Repository the run was for
    pub repository: RepositoryIdentity,
    /// Mode the caller chose
    pub mode: RunMode,
    /// Created version; `None` when the run was aborted
    pub version: Option<VersionHandle>,
    /// Pages generated during the run
    pub regenerated: Vec<String>,
    /// Pages copied forward unchanged
    pub copied: Vec<String>,
    /// Pages left out of the new version
    pub dropped: Vec<String>,
    /// Orphaned pages reported by impact mapping
    pub orphaned: Vec<String>,
    /// Pages sealed with unresolved diagram errors
    pub accepted_with_errors: Vec<PageDiagramErrors>,
}

impl RunOutcome {
    /// Whether the run created a version
    pub fn committed(&self) -> bool {
        self.version.is_some()
    }
}

/// Chooses what to do once the impact report is known
pub trait RunDecider: Send + Sync {
    /// Decide the run mode for this report
    fn decide(&self, report: &ImpactReport) -> RunDecision;
}

impl RunDecider for RunDecision {
    fn decide(&self, _report: &ImpactReport) -> RunDecision {
        *self
    }
}

/// Wiki generation run interface
#[async_trait]
pub trait WikiRunServiceInterface: Send + Sync {
    /// Capture, load the base version, diff and map impact
    async fn plan(&self, request: RunRequest) -> Result<RunPlan>;

    /// Generate the selected pages and commit the new version
    async fn execute(&self, plan: RunPlan, decision: RunDecision) -> Result<RunOutcome>;

    /// Plan, ask the decider, execute
    async fn run(&self, request: RunRequest, decider: &dyn RunDecider) -> Result<RunOutcome>;

    /// Like [`run`](Self::run), retrying the whole run on version conflicts
    async fn run_with_retry(
        &self,
        request: RunRequest,
        decider: &dyn RunDecider,
    ) -> Result<RunOutcome>;
}

/// Stored version administration interface
#[async_trait]
pub trait WikiCacheServiceInterface: Send + Sync {
    /// Summaries of every version, retired ones flagged
    async fn list_versions(&self, repository: &RepositoryIdentity) -> Result<Vec<VersionSummary>>;

    /// A specific version, or the latest non-retired one
    async fn show(&self, repository: &RepositoryIdentity, number: Option<u64>)
    -> Result<WikiVersion>;

    /// Retire a version
    async fn retire(&self, repository: &RepositoryIdentity, number: u64) -> Result<()>;

    /// Pages of a version that were accepted with diagram errors
    async fn diagram_report(
        &self,
        repository: &RepositoryIdentity,
        number: Option<u64>,
    ) -> Result<Vec<PageDiagramErrors>>;
}
