//! External scanner invocation.
//!
//! The scanner is started with the workspace as its working directory, so
//! no process-wide state is touched and concurrent scans stay independent.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tracing::{debug, error, info, instrument};

use crate::errors::{RunnerResult, ScanError};
use crate::report::ScanReport;
use crate::workspace::ScanWorkspace;

/// Longest stderr excerpt carried in [`ScanError::ExitStatus`].
const STDERR_SNIPPET: usize = 2_000;

/// Which scanner to run and how it identifies itself in reports.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Binary path or name resolved through `PATH`. Relative paths such as
    /// `./bin/spectral` are taken from the service's working directory.
    pub bin: PathBuf,
    /// Scanner name reported in ingestion metadata.
    pub name: String,
    /// Scanner version reported in ingestion metadata.
    pub version: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            bin: PathBuf::from("spectral"),
            name: "spectral".into(),
            version: "1.5.8".into(),
        }
    }
}

impl ScannerConfig {
    /// Arguments: scan the cwd tree, versioned JSON report, never fail on
    /// findings, never submit results on its own.
    fn args(&self, workspace: &ScanWorkspace) -> Vec<std::ffi::OsString> {
        vec![
            "scan".into(),
            "--json-v2".into(),
            workspace.report_path().as_os_str().to_owned(),
            "--ok".into(),
            "--nosend".into(),
        ]
    }
}

/// Runs the scanner over `workspace` and parses the report it writes.
#[instrument(name = "run_scanner", skip_all, fields(token = %workspace.token()))]
pub async fn run_scanner(cfg: &ScannerConfig, workspace: &ScanWorkspace) -> RunnerResult<ScanReport> {
    let started = Instant::now();
    let bin = resolve_bin(&cfg.bin)?;
    debug!(bin = %bin.display(), cwd = %workspace.root().display(), "starting scanner");

    let output = Command::new(&bin)
        .args(cfg.args(workspace))
        .current_dir(workspace.root())
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ScanError::Spawn {
            bin: cfg.bin.clone(),
            source,
        })?;

    if !output.status.success() {
        let stderr = snippet(&output.stderr);
        error!(code = ?output.status.code(), %stderr, "scanner failed");
        return Err(ScanError::ExitStatus {
            code: output.status.code(),
            stderr,
        });
    }

    let raw = tokio::fs::read(workspace.report_path())
        .await
        .map_err(|source| ScanError::ReadReport {
            path: workspace.report_path().to_path_buf(),
            source,
        })?;
    let report: ScanReport = serde_json::from_slice(&raw)?;

    info!(
        findings = report.items.len(),
        files_read = report.stats.total_files_read,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scanner finished"
    );
    Ok(report)
}

/// Anchors a relative binary path before the child changes directory.
/// Bare names are left alone so they still go through `PATH`.
fn resolve_bin(bin: &Path) -> RunnerResult<PathBuf> {
    if bin.is_absolute() || bin.components().count() < 2 {
        return Ok(bin.to_path_buf());
    }
    std::path::absolute(bin).map_err(|source| ScanError::Spawn {
        bin: bin.to_path_buf(),
        source,
    })
}

fn snippet(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    match trimmed.char_indices().nth(STDERR_SNIPPET) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
