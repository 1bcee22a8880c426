//! `repowiki generate`

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use repowiki_application::{RunPlan, WikiRunServiceInterface};
use repowiki_domain::ports::providers::RepositorySource;
use repowiki_domain::{RunDecision, RunMode};
use repowiki_infrastructure::AppContext;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::Output;
use super::outline::load_outline;

/// Arguments of `repowiki generate`
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Repository checkout
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Outline file (TOML or JSON); required on the first run
    #[arg(long)]
    pub outline: Option<PathBuf>,

    /// What to regenerate: all, impacted or abort
    #[arg(long, default_value = "impacted", conflicts_with = "ask")]
    pub mode: RunMode,

    /// Show the impact report and ask which mode to use
    #[arg(long)]
    pub ask: bool,

    /// Leave orphaned pages out instead of regenerating them
    #[arg(long)]
    pub drop_orphans: bool,

    /// Print the impact report and stop
    #[arg(long, conflicts_with = "ask")]
    pub plan_only: bool,
}

impl GenerateArgs {
    fn decision(&self, mode: RunMode) -> RunDecision {
        RunDecision {
            mode,
            drop_orphans: self.drop_orphans,
        }
    }
}

pub(super) async fn execute(
    context: &AppContext,
    args: GenerateArgs,
    cancel: CancellationToken,
) -> anyhow::Result<Output> {
    let source = context.open_repository(&args.repo)?;
    let repository = source.identity();
    let cleaned = context.clean_staging(&repository).await?;
    if cleaned > 0 {
        info!(repository = %repository, cleaned, "Removed staging leftovers");
    }

    let service = context.run_service(source)?;
    let mut request = context.run_request().with_cancel(cancel);
    if let Some(path) = &args.outline {
        request = request.with_outline(load_outline(path)?);
    }

    if args.plan_only {
        let plan = service.plan(request).await?;
        return Ok(Output::Json(plan_summary(&plan)));
    }

    let outcome = if args.ask {
        let plan = service.plan(request).await?;
        eprintln!("{}", serde_json::to_string_pretty(&plan_summary(&plan))?);
        let mode = tokio::task::spawn_blocking(prompt_mode)
            .await
            .context("Prompt task failed")??;
        service.execute(plan, args.decision(mode)).await?
    } else {
        service
            .run_with_retry(request, &args.decision(args.mode))
            .await?
    };

    Output::json(&outcome)
}

fn plan_summary(plan: &RunPlan) -> serde_json::Value {
    json!({
        "repository": plan.repository(),
        "base_version": plan.base.as_ref().map(|base| base.number),
        "next_version": plan.next_number,
        "files": plan.snapshot.len(),
        "pages": plan.pages.iter().map(|page| page.id.as_str()).collect::<Vec<_>>(),
        "impact": plan.report,
    })
}

/// Ask on the terminal; end of input aborts
fn prompt_mode() -> anyhow::Result<RunMode> {
    let stdin = std::io::stdin();
    let mut stderr = std::io::stderr();
    loop {
        write!(stderr, "Regenerate [a]ll, [i]mpacted, or [q]uit? ")?;
        stderr.flush()?;

        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer)? == 0 {
            return Ok(RunMode::Abort);
        }
        match answer.trim().to_lowercase().as_str() {
            "a" => return Ok(RunMode::RegenerateAll),
            "i" | "" => return Ok(RunMode::RegenerateImpacted),
            "q" => return Ok(RunMode::Abort),
            other => match other.parse::<RunMode>() {
                Ok(mode) => return Ok(mode),
                Err(e) => writeln!(stderr, "{e}")?,
            },
        }
    }
}
