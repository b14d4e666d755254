//! Scratch workspace holding a snapshot of a pull request's changed files.
//!
//! Layout under the temp root (token = 128 random bits, hex):
//!   <tmp>/<token>/               mirrored changed files
//!   <tmp>/<token>.report.json    scanner report (outside the scanned tree)
//!
//! The workspace owns both paths. [`ScanWorkspace::release`] removes them
//! asynchronously; a workspace dropped without release is removed on the
//! blocking pool. Neither happens when it was created with `keep = true`.

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, instrument, warn};
use vcs_gateway::ChangedFile;

use crate::errors::{RunnerResult, ScanError};

/// Options controlling where workspaces live and whether they survive.
#[derive(Debug, Clone)]
pub struct WorkspaceOptions {
    /// Parent directory for workspaces; usually the system temp dir.
    pub base_dir: PathBuf,
    /// Keep files on disk after the workspace is dropped.
    pub keep: bool,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            base_dir: std::env::temp_dir(),
            keep: false,
        }
    }
}

/// A uniquely named directory populated with changed files.
#[derive(Debug)]
pub struct ScanWorkspace {
    token: String,
    root: PathBuf,
    report_path: PathBuf,
    keep: bool,
    released: bool,
}

impl ScanWorkspace {
    /// Creates a fresh workspace and writes every changed file into it.
    ///
    /// Contents are written verbatim. On failure the partially written
    /// workspace is released before the error is returned.
    #[instrument(name = "materialize_workspace", skip_all, fields(files = files.len()))]
    pub async fn materialize(files: &[ChangedFile], opts: &WorkspaceOptions) -> RunnerResult<Self> {
        // The scanner runs inside the workspace, so a relative base would
        // resolve the report path against the wrong directory.
        let base_dir =
            std::path::absolute(&opts.base_dir).map_err(|source| ScanError::Materialize {
                path: opts.base_dir.clone(),
                source,
            })?;
        let token = random_token();
        let root = base_dir.join(&token);
        let report_path = base_dir.join(format!("{token}.report.json"));

        fs::create_dir(&root)
            .await
            .map_err(|source| ScanError::Materialize {
                path: root.clone(),
                source,
            })?;

        let workspace = Self {
            token,
            root,
            report_path,
            keep: opts.keep,
            released: false,
        };
        debug!(root = %workspace.root.display(), "workspace created");

        for file in files {
            if let Err(e) = workspace.write_file(file).await {
                workspace.release().await;
                return Err(e);
            }
        }

        info!(
            root = %workspace.root.display(),
            files = files.len(),
            "workspace materialized"
        );
        Ok(workspace)
    }

    async fn write_file(&self, file: &ChangedFile) -> RunnerResult<()> {
        let relative = safe_relative_path(&file.path)?;
        let target = self.root.join(relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| ScanError::Materialize {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        fs::write(&target, &file.content)
            .await
            .map_err(|source| ScanError::Materialize {
                path: target.clone(),
                source,
            })
    }

    /// Random directory name of this workspace.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Directory the scanner must run in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the scanner writes its result document.
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Removes the workspace and its report without blocking the runtime.
    pub async fn release(mut self) {
        self.released = true;
        if self.keep {
            info!(root = %self.root.display(), "keeping workspace for inspection");
            return;
        }

        if let Err(e) = fs::remove_dir_all(&self.root).await {
            warn!(root = %self.root.display(), error = %e, "failed to remove workspace");
        }
        match fs::remove_file(&self.report_path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                warn!(path = %self.report_path.display(), error = %e, "failed to remove scan report");
            }
            _ => {}
        }
    }
}

impl Drop for ScanWorkspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if self.keep {
            info!(root = %self.root.display(), "keeping workspace for inspection");
            return;
        }

        let root = std::mem::take(&mut self.root);
        let report_path = std::mem::take(&mut self.report_path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_blocking(&root, &report_path));
            }
            Err(_) => remove_blocking(&root, &report_path),
        }
    }
}

fn remove_blocking(root: &Path, report_path: &Path) {
    if let Err(e) = std::fs::remove_dir_all(root) {
        warn!(root = %root.display(), error = %e, "failed to remove workspace");
    }
    match std::fs::remove_file(report_path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            warn!(path = %report_path.display(), error = %e, "failed to remove scan report");
        }
        _ => {}
    }
}

fn random_token() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

/// Accepts only plain relative paths; `..`, roots and prefixes are rejected.
fn safe_relative_path(path: &str) -> RunnerResult<&Path> {
    let p = Path::new(path);
    let ok = !path.is_empty()
        && p.components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    if ok {
        Ok(p)
    } else {
        Err(ScanError::UnsafePath(path.to_string()))
    }
}
