//! Workspace materialization and scanner execution.
//!
//! A [`ScanWorkspace`] mirrors the changed files of a pull request into a
//! private scratch directory; [`run_scanner`] executes the external scanner
//! rooted at that directory and returns its parsed [`ScanReport`].

pub mod errors;
pub mod report;
pub mod scanner;
pub mod workspace;

pub use errors::{RunnerResult, ScanError};
pub use report::{Finding, Position, ScanDuration, ScanReport, ScanStats};
pub use scanner::{ScannerConfig, run_scanner};
pub use workspace::{ScanWorkspace, WorkspaceOptions};
