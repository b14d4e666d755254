//! Pipeline error taxonomy: one variant per stage.

use ingest_client::IngestError;
use scan_runner::ScanError;
use thiserror::Error;
use vcs_gateway::VcsError;

/// Convenient alias for pipeline results.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// An HTTP client could not be constructed.
    #[error("client setup failed: {0}")]
    Setup(String),

    /// Changed-file listing or content retrieval failed.
    #[error("fetch failed: {0}")]
    Fetch(#[source] VcsError),

    /// Workspace materialization or scanner execution failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Submission to the ingestion service failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Creating or updating the check run failed.
    #[error("check run update failed: {0}")]
    CheckRun(#[source] VcsError),
}

impl PipelineError {
    /// Short stage label used in logs and check-run error reports.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup",
            Self::Fetch(_) => "fetch",
            Self::Scan(ScanError::Materialize { .. } | ScanError::UnsafePath(_)) => "materialize",
            Self::Scan(_) => "scanner",
            Self::Ingest(_) => "ingest",
            Self::CheckRun(_) => "check_run",
        }
    }
}
