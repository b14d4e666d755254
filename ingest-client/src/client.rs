//! HTTP submission of ingestion payloads.
//!
//! One `POST {host}/api/v1/ingest?dsn=<DSN>` per scan. Only `200 OK` counts
//! as accepted; every other outcome is terminal for the invocation and is
//! never retried.

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::dsn::IngestDsn;
use crate::errors::{IngestError, IngestResult};
use crate::payload::IngestionPayload;

/// Issue that exists only in the scanned variant (new compared to prior scans).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VariantIssue {
    pub detector_name: String,
    pub uri: String,
    pub path: String,
}

/// Scan identifier assigned by the service; numeric or textual on the wire.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ScanPid {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for ScanPid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Accepted ingestion: what is new in this variant and where to see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub unique_issues: Vec<VariantIssue>,
    pub scan_pid: ScanPid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestResponse {
    asset_changes: AssetChanges,
    scan_pid: ScanPid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetChanges {
    #[serde(default)]
    issues_only_in_this_variant: Vec<VariantIssue>,
}

/// Thin client bound to one DSN.
#[derive(Debug, Clone)]
pub struct IngestClient {
    http: reqwest::Client,
    dsn: IngestDsn,
}

impl IngestClient {
    pub fn new(dsn: IngestDsn) -> IngestResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("pr-scan-backend/0.1")
            .build()?;
        Ok(Self { http, dsn })
    }

    pub fn dsn(&self) -> &IngestDsn {
        &self.dsn
    }

    /// Submits `payload` and returns the variant-unique issues on `200 OK`.
    #[instrument(
        name = "ingest_submit",
        skip_all,
        fields(asset = %payload.asset.name, issues = payload.issues.len())
    )]
    pub async fn submit(&self, payload: &IngestionPayload) -> IngestResult<IngestOutcome> {
        let url = self.dsn.ingest_url();
        debug!(%url, "submitting scan results");

        let resp = self
            .http
            .post(&url)
            .query(&[("dsn", self.dsn.as_str())])
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;

        if status != StatusCode::OK {
            let body = describe_error_body(&body);
            error!(%status, %body, "ingest request failed");
            return Err(IngestError::Rejected { status, body });
        }

        let parsed: IngestResponse = serde_json::from_slice(&body)?;
        info!(
            unique_issues = parsed.asset_changes.issues_only_in_this_variant.len(),
            scan_pid = %parsed.scan_pid,
            "scan results ingested"
        );

        Ok(IngestOutcome {
            unique_issues: parsed.asset_changes.issues_only_in_this_variant,
            scan_pid: parsed.scan_pid,
        })
    }
}

/// Compact JSON rendering of an error body; raw text when it is not JSON.
fn describe_error_body(body: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(v) => v.to_string(),
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}
