//! Service configuration loaded from environment variables.
//!
//! # Environment variables
//!
//! - `GITHUB_API_BASE`      = VCS REST base (default `https://api.github.com`)
//! - `GITHUB_TOKEN`         = VCS access token (required)
//! - `SCAN_DSN`             = ingestion DSN `<credential>@<host>` (required; `SPECTRAL_DSN` also accepted)
//! - `SCANNER_BIN`          = scanner binary (default `spectral`)
//! - `SCANNER_NAME`         = scanner name in payload metadata (default `spectral`)
//! - `SCANNER_VERSION`      = scanner version in payload metadata (default `1.5.8`)
//! - `CHECK_RUN_NAME`       = check-run name (default `Spectral scan`)
//! - `SCAN_WORKSPACE_DIR`   = parent dir for scratch workspaces (default: system temp dir)
//! - `SCAN_KEEP_WORKSPACE`  = keep workspaces after the scan (default `false`)
//! - `SCAN_REPORT_FAILURES` = complete the check run as failed on pipeline errors (default `false`)

use std::path::PathBuf;

use ingest_client::IngestDsn;
use scan_runner::{ScannerConfig, WorkspaceOptions};
use thiserror::Error;
use vcs_gateway::GitHubConfig;

const DEFAULT_GITHUB_API: &str = "https://api.github.com";
const DEFAULT_CHECK_RUN_NAME: &str = "Spectral scan";

/// Error enum for environment-driven setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// Value had the wrong format.
    #[error("invalid format in {var}: {reason}")]
    InvalidFormat { var: &'static str, reason: String },
}

/// Per-invocation pipeline knobs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub check_run_name: String,
    pub scanner: ScannerConfig,
    pub workspace: WorkspaceOptions,
    /// When set, a failed pipeline completes its check run with `failure`
    /// instead of leaving it `in_progress`.
    pub report_failures: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            check_run_name: DEFAULT_CHECK_RUN_NAME.into(),
            scanner: ScannerConfig::default(),
            workspace: WorkspaceOptions::default(),
            report_failures: false,
        }
    }
}

/// Everything needed to build a [`crate::ScanPipeline`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub github: GitHubConfig,
    pub dsn: IngestDsn,
    pub pipeline: PipelineConfig,
}

impl ServiceConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("GITHUB_TOKEN").ok_or(ConfigError::MissingVar("GITHUB_TOKEN"))?;
        let base_api = get("GITHUB_API_BASE").unwrap_or_else(|| DEFAULT_GITHUB_API.into());
        if !(base_api.starts_with("http://") || base_api.starts_with("https://")) {
            return Err(ConfigError::InvalidFormat {
                var: "GITHUB_API_BASE",
                reason: "must start with http:// or https://".into(),
            });
        }

        let raw_dsn = get("SCAN_DSN")
            .or_else(|| get("SPECTRAL_DSN"))
            .ok_or(ConfigError::MissingVar("SCAN_DSN"))?;
        let dsn = IngestDsn::parse(&raw_dsn).map_err(|e| ConfigError::InvalidFormat {
            var: "SCAN_DSN",
            reason: e.to_string(),
        })?;

        let defaults = ScannerConfig::default();
        let scanner = ScannerConfig {
            bin: get("SCANNER_BIN").map(PathBuf::from).unwrap_or(defaults.bin),
            name: get("SCANNER_NAME").unwrap_or(defaults.name),
            version: get("SCANNER_VERSION").unwrap_or(defaults.version),
        };

        let workspace = WorkspaceOptions {
            base_dir: get("SCAN_WORKSPACE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            keep: parse_bool("SCAN_KEEP_WORKSPACE", get("SCAN_KEEP_WORKSPACE"))?,
        };

        Ok(Self {
            github: GitHubConfig { base_api, token },
            dsn,
            pipeline: PipelineConfig {
                check_run_name: get("CHECK_RUN_NAME")
                    .unwrap_or_else(|| DEFAULT_CHECK_RUN_NAME.into()),
                scanner,
                workspace,
                report_failures: parse_bool("SCAN_REPORT_FAILURES", get("SCAN_REPORT_FAILURES"))?,
            },
        })
    }
}

fn parse_bool(var: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(v) = value else {
        return Ok(false);
    };
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFormat {
            var,
            reason: format!("expected a boolean, got '{v}'"),
        }),
    }
}
