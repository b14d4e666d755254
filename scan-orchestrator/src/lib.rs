//! Pull-request scan pipeline.
//!
//! One [`ScanPipeline::run`] call handles one pull-request event end to end:
//!
//! 1. create the check run (`in_progress`)
//! 2. fetch changed files at head
//! 3. materialize them into a private workspace
//! 4. run the scanner over the workspace
//! 5. normalize the report into an ingestion payload
//! 6. submit the payload
//! 7. complete the check run with the rendered report
//!
//! Invocations share nothing mutable, so any number may run concurrently.

pub mod check_run;
pub mod config;
pub mod errors;

use chrono::Utc;
use ingest_client::{AssetDescriptor, IngestClient, IngestOutcome, ScanPid, ScannerInfo, normalize};
use scan_runner::{ScanWorkspace, run_scanner};
use tracing::{error, info, instrument, warn};
use vcs_gateway::{CheckConclusion, CheckRunId, GitHubClient, PullRequestContext, fetch_changed_files};

pub use check_run::{CheckRunController, CheckRunState, render_internal_error, render_outcome};
pub use config::{ConfigError, PipelineConfig, ServiceConfig};
pub use errors::{PipelineError, PipelineResult};

/// What a finished invocation reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub check_run_id: CheckRunId,
    pub conclusion: CheckConclusion,
    pub unique_issues: usize,
    pub scan_pid: ScanPid,
}

/// Long-lived pipeline: clients and configuration shared by all invocations.
#[derive(Debug, Clone)]
pub struct ScanPipeline {
    github: GitHubClient,
    ingest: IngestClient,
    config: PipelineConfig,
}

impl ScanPipeline {
    pub fn new(cfg: ServiceConfig) -> PipelineResult<Self> {
        let github =
            GitHubClient::from_config(cfg.github).map_err(|e| PipelineError::Setup(e.to_string()))?;
        let ingest = IngestClient::new(cfg.dsn).map_err(|e| PipelineError::Setup(e.to_string()))?;
        Ok(Self::from_parts(github, ingest, cfg.pipeline))
    }

    pub fn from_parts(github: GitHubClient, ingest: IngestClient, config: PipelineConfig) -> Self {
        Self {
            github,
            ingest,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage for `ctx` and drives its check run.
    ///
    /// A failure after the check run exists either leaves it `in_progress`
    /// or, with `report_failures`, completes it as `failure`. The original
    /// error is returned in both cases.
    #[instrument(
        name = "scan_pipeline",
        skip(self, ctx),
        fields(repo = %ctx.full_name(), pr = ctx.number, head = %ctx.head_sha)
    )]
    pub async fn run(&self, ctx: &PullRequestContext) -> PipelineResult<ScanSummary> {
        let mut check = CheckRunController::new(&self.github, ctx);
        let check_run_id = check.start(&self.config.check_run_name).await?;

        let outcome = match self.scan_and_ingest(ctx).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(stage = err.stage(), error = %err, "scan pipeline failed");
                if self.config.report_failures {
                    if let Err(report_err) = check.fail(&err).await {
                        warn!(error = %report_err, "could not report failure on check run");
                    }
                } else {
                    check.abandon();
                }
                return Err(err);
            }
        };

        let scan_url = self.ingest.dsn().scan_url(&outcome.scan_pid.to_string());
        let (conclusion, output) = render_outcome(ctx, &outcome, &scan_url);
        check.complete(conclusion, output).await?;

        info!(
            %check_run_id,
            ?conclusion,
            unique_issues = outcome.unique_issues.len(),
            "pull request scanned"
        );

        Ok(ScanSummary {
            check_run_id,
            conclusion,
            unique_issues: outcome.unique_issues.len(),
            scan_pid: outcome.scan_pid,
        })
    }

    async fn scan_and_ingest(&self, ctx: &PullRequestContext) -> PipelineResult<IngestOutcome> {
        let files = fetch_changed_files(&self.github, ctx)
            .await
            .map_err(PipelineError::Fetch)?;

        // Workspace lives only until the payload is built, on success or not.
        let workspace = ScanWorkspace::materialize(&files, &self.config.workspace).await?;
        let payload = run_scanner(&self.config.scanner, &workspace)
            .await
            .map(|report| {
                normalize(
                    &AssetDescriptor::from_context(ctx),
                    &report,
                    workspace.root(),
                    &ScannerInfo {
                        name: self.config.scanner.name.clone(),
                        version: self.config.scanner.version.clone(),
                    },
                    Utc::now(),
                )
            });
        workspace.release().await;

        Ok(self.ingest.submit(&payload?).await?)
    }
}
