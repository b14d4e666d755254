//! Result Normalizer: scanner report + pull-request identity → ingestion payload.
//!
//! Everything here is pure. Findings map one-to-one onto issues in report
//! order, and fingerprints are copied byte-for-byte.

use std::path::Path;

use chrono::{DateTime, Utc};
use scan_runner::{Finding, Position, ScanReport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vcs_gateway::PullRequestContext;

const DEFAULT_HOST: &str = "github.com";
const ASSET_KIND: &str = "git";

/// Identity of the scanned repository variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Full repository name, `owner/repo`.
    pub name: String,
    /// Repository web URL; issue absolute paths are built on top of it.
    pub uri: String,
    /// Head commit SHA.
    pub git_ref: String,
    /// Head branch name.
    pub variant: String,
    /// VCS host, e.g. `github.com`.
    pub host: String,
}

impl AssetDescriptor {
    pub fn from_context(ctx: &PullRequestContext) -> Self {
        let host = url::Url::parse(&ctx.repo_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Self {
            name: ctx.full_name(),
            uri: ctx.repo_url.clone(),
            git_ref: ctx.head_sha.clone(),
            variant: ctx.head_ref.clone(),
            host,
        }
    }
}

/// Name and version of the scanner, as reported in payload metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScannerInfo {
    pub name: String,
    pub version: String,
}

/// Wire body of `POST /api/v1/ingest`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionPayload {
    pub asset: Asset,
    pub time: DateTime<Utc>,
    pub issues: Vec<Issue>,
    pub stats: PayloadStats,
    pub metadata: PayloadMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub uri: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub name: String,
    pub variant: String,
    pub source: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub relative_path: String,
    pub absolute_path: String,
    pub position: Position,
    #[serde(rename = "line_start")]
    pub line_start: u64,
    pub fingerprint: String,
    pub rule: Rule,
    pub metadata: IssueMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub severity: String,
    pub description: String,
}

/// Marks issues produced by the pull-request scan path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueMetadata {
    #[serde(rename = "isGithubAppProbotScan")]
    pub pr_scan: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PayloadStats {
    pub total_files_read: u64,
    pub total_bytes_read: u64,
    pub duration_millis: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayloadMetadata {
    pub scanner: ScannerInfo,
    pub scan_context: Value,
}

/// Builds the ingestion payload for one scan.
pub fn normalize(
    asset: &AssetDescriptor,
    report: &ScanReport,
    workspace_root: &Path,
    scanner: &ScannerInfo,
    time: DateTime<Utc>,
) -> IngestionPayload {
    let issues = report
        .items
        .iter()
        .map(|finding| to_issue(asset, finding, workspace_root))
        .collect();

    IngestionPayload {
        asset: Asset {
            id: format!("git://{}/{}", asset.host, asset.name),
            uri: asset.uri.clone(),
            git_ref: asset.git_ref.clone(),
            name: asset.name.clone(),
            variant: asset.variant.clone(),
            source: asset.host.clone(),
            kind: ASSET_KIND.to_string(),
        },
        time,
        issues,
        stats: PayloadStats {
            total_files_read: report.stats.total_files_read,
            total_bytes_read: report.stats.total_bytes_read,
            duration_millis: report.stats.duration.as_millis(),
        },
        metadata: PayloadMetadata {
            scanner: scanner.clone(),
            scan_context: report.run_context.clone(),
        },
    }
}

fn to_issue(asset: &AssetDescriptor, finding: &Finding, workspace_root: &Path) -> Issue {
    let relative_path = relative_path(&finding.finding, workspace_root);
    let absolute_path = format!("{}{}", asset.uri, relative_path);

    Issue {
        relative_path,
        absolute_path,
        position: finding.position,
        line_start: finding.position.start_line(),
        fingerprint: finding.fingerprint.clone(),
        rule: Rule {
            id: finding.rule_id.clone(),
            name: finding.rule_desc.clone(),
            severity: finding.severity.clone(),
            description: finding.rule_desc.clone(),
        },
        metadata: IssueMetadata { pr_scan: true },
    }
}

/// Strips everything up to and including the workspace root from `finding`.
///
/// The result keeps its leading `/`, e.g. `/tmp/ab12/src/a.py` → `/src/a.py`.
/// The token alone is searched when the scanner reports a resolved alias of
/// the root (e.g. `/private/tmp` for `/tmp`); paths that contain neither are
/// taken as already relative to the root.
pub fn relative_path(finding: &str, workspace_root: &Path) -> String {
    let root = workspace_root.to_string_lossy();
    let root = root.trim_end_matches('/');

    if !root.is_empty() {
        if let Some(idx) = finding.find(root) {
            return finding[idx + root.len()..].to_string();
        }
    }

    if let Some(token) = workspace_root.file_name().map(|t| t.to_string_lossy()) {
        let marker = format!("/{token}");
        if let Some(idx) = finding.find(&marker) {
            return finding[idx + marker.len()..].to_string();
        }
    }

    let rest = finding.trim_start_matches("./").trim_start_matches('/');
    format!("/{rest}")
}

#[cfg(test)]
mod tests {
    use scan_runner::{ScanDuration, ScanStats};
    use serde_json::json;

    use super::*;

    fn asset() -> AssetDescriptor {
        AssetDescriptor {
            name: "acme/shop".into(),
            uri: "https://github.com/acme/shop".into(),
            git_ref: "h1".into(),
            variant: "feature/pay".into(),
            host: "github.com".into(),
        }
    }

    fn scanner() -> ScannerInfo {
        ScannerInfo {
            name: "spectral".into(),
            version: "1.5.8".into(),
        }
    }

    fn finding(path: &str, fingerprint: &str, line: u64) -> Finding {
        Finding {
            finding: path.into(),
            position: Position {
                start: [line, 1],
                end: [line, 20],
            },
            fingerprint: fingerprint.into(),
            rule_id: "CLD001".into(),
            rule_desc: "Visible AWS key".into(),
            severity: "error".into(),
        }
    }

    fn report(items: Vec<Finding>, nanos: u64) -> ScanReport {
        ScanReport {
            items,
            run_context: json!({ "host": "runner-1" }),
            stats: ScanStats {
                total_files_read: 2,
                total_bytes_read: 512,
                duration: ScanDuration { secs: 0, nanos },
            },
        }
    }

    #[test]
    fn asset_descriptor_from_context() {
        let ctx = PullRequestContext {
            owner: "acme".into(),
            repo: "shop".into(),
            number: 1,
            title: String::new(),
            html_url: String::new(),
            base_sha: "b1".into(),
            head_sha: "h1".into(),
            head_ref: "feature/pay".into(),
            repo_url: "https://github.example.org/acme/shop".into(),
        };
        let a = AssetDescriptor::from_context(&ctx);
        assert_eq!(a.name, "acme/shop");
        assert_eq!(a.git_ref, "h1");
        assert_eq!(a.variant, "feature/pay");
        assert_eq!(a.host, "github.example.org");
    }

    #[test]
    fn maps_every_finding_to_one_issue() {
        let root = Path::new("/tmp/0f3a9c");
        let items = vec![
            finding("/tmp/0f3a9c/src/a.py", "f1", 10),
            finding("/tmp/0f3a9c/src/a.py", "f2", 22),
            finding("/tmp/0f3a9c/lib/deep/b.rs", "f3", 1),
        ];
        let payload = normalize(&asset(), &report(items.clone(), 0), root, &scanner(), Utc::now());

        assert_eq!(payload.issues.len(), items.len());
        for (issue, finding) in payload.issues.iter().zip(&items) {
            assert_eq!(issue.fingerprint, finding.fingerprint);
            assert_eq!(issue.position, finding.position);
            assert_eq!(
                issue.absolute_path,
                format!("{}{}", asset().uri, issue.relative_path)
            );
        }
        assert_eq!(payload.issues[0].relative_path, "/src/a.py");
        assert_eq!(payload.issues[2].relative_path, "/lib/deep/b.rs");
        assert_eq!(payload.issues[0].line_start, 10);
    }

    #[test]
    fn fingerprint_is_copied_verbatim() {
        let odd = "  Sha256:AbC/+==\u{00e9}\t";
        let payload = normalize(
            &asset(),
            &report(vec![finding("/w/tok/x", odd, 1)], 0),
            Path::new("/w/tok"),
            &scanner(),
            Utc::now(),
        );
        assert_eq!(payload.issues[0].fingerprint.as_bytes(), odd.as_bytes());
    }

    #[test]
    fn stats_and_asset_fields() {
        let payload = normalize(
            &asset(),
            &report(vec![], 1_999_999),
            Path::new("/tmp/x"),
            &scanner(),
            Utc::now(),
        );
        assert!(payload.issues.is_empty());
        assert_eq!(payload.stats.duration_millis, 1);
        assert_eq!(payload.stats.total_files_read, 2);
        assert_eq!(payload.stats.total_bytes_read, 512);
        assert_eq!(payload.asset.id, "git://github.com/acme/shop");
        assert_eq!(payload.asset.source, "github.com");
        assert_eq!(payload.asset.kind, "git");
        assert_eq!(payload.asset.git_ref, "h1");
        assert_eq!(payload.metadata.scan_context["host"], "runner-1");
    }

    #[test]
    fn serializes_to_ingestion_wire_shape() {
        let payload = normalize(
            &asset(),
            &report(vec![finding("/tmp/t/src/a.py", "f1", 10)], 5_000_000),
            Path::new("/tmp/t"),
            &scanner(),
            "2026-01-02T03:04:05Z".parse().unwrap(),
        );
        let v = serde_json::to_value(&payload).unwrap();

        assert_eq!(v["asset"]["ref"], "h1");
        assert_eq!(v["asset"]["variant"], "feature/pay");
        assert_eq!(v["time"], "2026-01-02T03:04:05Z");
        assert_eq!(v["issues"][0]["relativePath"], "/src/a.py");
        assert_eq!(v["issues"][0]["absolutePath"], "https://github.com/acme/shop/src/a.py");
        assert_eq!(v["issues"][0]["line_start"], 10);
        assert_eq!(v["issues"][0]["position"]["start"], json!([10, 1]));
        assert_eq!(v["issues"][0]["rule"]["name"], "Visible AWS key");
        assert_eq!(v["issues"][0]["metadata"]["isGithubAppProbotScan"], true);
        assert_eq!(v["stats"]["durationMillis"], 5);
        assert_eq!(v["stats"]["totalFilesRead"], 2);
        assert_eq!(v["metadata"]["scanner"]["version"], "1.5.8");
        assert_eq!(v["metadata"]["scanContext"]["host"], "runner-1");
    }

    #[test]
    fn relative_path_variants() {
        let root = Path::new("/tmp/0f3a9c");
        assert_eq!(relative_path("/tmp/0f3a9c/src/a.py", root), "/src/a.py");
        assert_eq!(relative_path("/private/tmp/0f3a9c/src/a.py", root), "/src/a.py");
        assert_eq!(relative_path("./src/a.py", root), "/src/a.py");
        assert_eq!(relative_path("src/a.py", root), "/src/a.py");
    }
}
