//! Check-run lifecycle and report rendering.
//!
//! A controller owns one check run for one pipeline invocation and only
//! moves it forward: `Queued -> InProgress -> Completed | Abandoned`.

use ingest_client::IngestOutcome;
use tracing::{info, instrument, warn};
use vcs_gateway::{
    CheckConclusion, CheckRunId, CheckRunOutput, CheckRunStatus, CheckRunUpdate, GitHubClient,
    NewCheckRun, PullRequestContext,
};

use crate::errors::{PipelineError, PipelineResult};

const OUTPUT_TITLE: &str = "Spectral";
const LOGO_LINE: &str = "<img src='https://spectralops.io/wp-content/themes/tg/assets/images/sections/footer/logo.svg' width='200'/>";
const PRODUCT_BLURB: &str =
    "Spectral is a developer-first security tool to identify and monitor secrets in your code and cloud.";
const INTERNAL_ERROR_SUMMARY: &str = "Scan could not be completed due to an internal error.";

/// Where a check run stands from this invocation's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckRunState {
    /// Not yet created on the provider.
    Queued,
    InProgress,
    Completed(CheckConclusion),
    /// Left `in_progress` on the provider after a pipeline failure.
    Abandoned,
}

impl CheckRunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed(_) | Self::Abandoned)
    }
}

/// Drives a single check run through its states.
pub struct CheckRunController<'a> {
    github: &'a GitHubClient,
    owner: String,
    repo: String,
    head_sha: String,
    base_sha: String,
    id: Option<CheckRunId>,
    state: CheckRunState,
}

impl<'a> CheckRunController<'a> {
    pub fn new(github: &'a GitHubClient, ctx: &PullRequestContext) -> Self {
        Self {
            github,
            owner: ctx.owner.clone(),
            repo: ctx.repo.clone(),
            head_sha: ctx.head_sha.clone(),
            base_sha: ctx.base_sha.clone(),
            id: None,
            state: CheckRunState::Queued,
        }
    }

    pub fn state(&self) -> CheckRunState {
        self.state
    }

    pub fn id(&self) -> Option<CheckRunId> {
        self.id
    }

    /// Creates the check run directly in `in_progress`.
    #[instrument(name = "check_run_start", skip(self), fields(repo = %self.repo, head = %self.head_sha))]
    pub async fn start(&mut self, name: &str) -> PipelineResult<CheckRunId> {
        if let Some(id) = self.id {
            warn!(%id, "check run already started");
            return Ok(id);
        }

        let id = self
            .github
            .create_check_run(
                &self.owner,
                &self.repo,
                &NewCheckRun {
                    name: name.to_string(),
                    head_sha: self.head_sha.clone(),
                    base_sha: self.base_sha.clone(),
                    status: CheckRunStatus::InProgress,
                },
            )
            .await
            .map_err(PipelineError::CheckRun)?;

        info!(%id, "check run created");
        self.id = Some(id);
        self.state = CheckRunState::InProgress;
        Ok(id)
    }

    /// Moves an in-progress check run to `completed` with the given report.
    pub async fn complete(
        &mut self,
        conclusion: CheckConclusion,
        output: CheckRunOutput,
    ) -> PipelineResult<()> {
        let Some(id) = self.active_id() else {
            return Ok(());
        };

        self.github
            .update_check_run(
                &self.owner,
                &self.repo,
                id,
                &CheckRunUpdate::completed(conclusion, output),
            )
            .await
            .map_err(PipelineError::CheckRun)?;

        info!(%id, ?conclusion, "check run completed");
        self.state = CheckRunState::Completed(conclusion);
        Ok(())
    }

    /// Reports a pipeline failure as a `failure` conclusion.
    pub async fn fail(&mut self, err: &PipelineError) -> PipelineResult<()> {
        self.complete(CheckConclusion::Failure, render_internal_error(err))
            .await
    }

    /// Leaves the check run as it is on the provider.
    pub fn abandon(&mut self) {
        if self.state == CheckRunState::InProgress {
            warn!(id = ?self.id, "check run left in progress");
            self.state = CheckRunState::Abandoned;
        }
    }

    fn active_id(&self) -> Option<CheckRunId> {
        match (self.state, self.id) {
            (CheckRunState::InProgress, Some(id)) => Some(id),
            (state, _) => {
                warn!(?state, "ignoring transition on inactive check run");
                None
            }
        }
    }
}

/// Conclusion and report for an accepted ingestion.
///
/// Zero unique issues is a `success` with an empty detail body; anything
/// else is a `failure` listing every issue in response order.
pub fn render_outcome(
    ctx: &PullRequestContext,
    outcome: &IngestOutcome,
    scan_url: &str,
) -> (CheckConclusion, CheckRunOutput) {
    let count = outcome.unique_issues.len();
    let summary = format!("{LOGO_LINE}\n{}", issue_count_sentence(count));

    if count == 0 {
        return (
            CheckConclusion::Success,
            CheckRunOutput {
                title: OUTPUT_TITLE.into(),
                summary,
                text: String::new(),
            },
        );
    }

    let rows = outcome
        .unique_issues
        .iter()
        .map(|i| format!("|{}|{}|[view code]({})|", i.detector_name, i.path, i.uri))
        .collect::<Vec<_>>()
        .join("\n");

    let text = format!(
        "PR: [{title}]({url})\n\
         Here are the issues we found in your PR:\n\
         |Detector|File Path||\n\
         |---|---|---|\n\
         {rows}\n\n\
         [See scan]({scan_url}) in SpectralOps.\n\
         {PRODUCT_BLURB}",
        title = ctx.title,
        url = ctx.html_url,
    );

    (
        CheckConclusion::Failure,
        CheckRunOutput {
            title: OUTPUT_TITLE.into(),
            summary,
            text,
        },
    )
}

/// Report used when the pipeline could not finish.
pub fn render_internal_error(err: &PipelineError) -> CheckRunOutput {
    CheckRunOutput {
        title: OUTPUT_TITLE.into(),
        summary: format!("{LOGO_LINE}\n{INTERNAL_ERROR_SUMMARY}"),
        text: format!("Stage `{}` failed: {err}", err.stage()),
    }
}

fn issue_count_sentence(count: usize) -> String {
    if count == 1 {
        "There is 1 issue found in this PR changes.".to_string()
    } else {
        format!("There are {count} issues found in this PR changes.")
    }
}
