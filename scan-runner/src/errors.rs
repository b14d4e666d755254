use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type RunnerResult<T> = Result<T, ScanError>;

/// Failures while preparing the workspace or running the scanner.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Directory creation or file write failed inside the workspace.
    #[error("failed to materialize '{}': {source}", path.display())]
    Materialize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A changed-file path would escape the workspace root.
    #[error("refusing to materialize unsafe path '{0}'")]
    UnsafePath(String),

    /// The scanner binary could not be started.
    #[error("failed to start scanner '{}': {source}", bin.display())]
    Spawn {
        bin: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scanner exited unsuccessfully.
    #[error("scanner exited with {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },

    /// The report document could not be read back.
    #[error("failed to read scan report '{}': {source}", path.display())]
    ReadReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report document is not a valid result document.
    #[error("malformed scan report: {0}")]
    ParseReport(#[from] serde_json::Error),
}
