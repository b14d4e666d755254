//! GitHub provider (REST v3) for commit comparisons, file contents and check runs.
//!
//! Endpoints used:
//!   * GET   /repos/{owner}/{repo}/compare/{base}...{head}
//!   * GET   /repos/{owner}/{repo}/contents/{path}?ref={ref}
//!   * POST  /repos/{owner}/{repo}/check-runs
//!   * PATCH /repos/{owner}/{repo}/check-runs/{check_run_id}

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::{VcsError, VcsResult};
use crate::types::{CheckRunId, CheckRunUpdate, CompareFile, NewCheckRun};

const ACCEPT_JSON: &str = "application/vnd.github+json";

/// Runtime configuration for the GitHub client.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base, e.g. "https://api.github.com".
    pub base_api: String,
    /// Access token (PAT or installation token).
    pub token: String,
}

/// GitHub HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String,
    token: String,
}

impl GitHubClient {
    /// Builds the client with a stable user agent so GitHub can identify the integration.
    pub fn from_config(cfg: GitHubConfig) -> VcsResult<Self> {
        debug!("Initializing GitHub client: base_api={}", cfg.base_api);

        let http = reqwest::Client::builder()
            .user_agent("pr-scan-backend/0.1")
            .build()?;

        Ok(Self::new(http, cfg.base_api, cfg.token))
    }

    /// Constructs a GitHub client with a shared HTTP instance and auth token.
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        Self {
            http,
            base_api: base_api.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Lists the files changed between `base` and `head`.
    pub async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> VcsResult<Vec<CompareFile>> {
        let url = format!(
            "{}/repos/{}/{}/compare/{}...{}",
            self.base_api, owner, repo, base, head
        );
        debug!("GitHub compare_commits: {}", url);

        // NOTE: GitHub caps the file list of a comparison at 300 entries.
        let resp: GitHubCompare = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_JSON)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.files)
    }

    /// Fetches a file at `git_ref` and returns its decoded bytes.
    pub async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> VcsResult<Vec<u8>> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_api,
            owner,
            repo,
            encode_path(path)
        );
        debug!("GitHub get_file_content: url={}, ref={}", url, git_ref);

        let resp: GitHubContent = self
            .http
            .get(url)
            .query(&[("ref", git_ref)])
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_JSON)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        decode_content(path, &resp)
    }

    /// Creates a check run and returns its identifier.
    pub async fn create_check_run(
        &self,
        owner: &str,
        repo: &str,
        check: &NewCheckRun,
    ) -> VcsResult<CheckRunId> {
        let url = format!("{}/repos/{}/{}/check-runs", self.base_api, owner, repo);
        debug!("GitHub create_check_run: url={}, head_sha={}", url, check.head_sha);

        let resp: GitHubCheckRun = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_JSON)
            .json(check)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(CheckRunId(resp.id))
    }

    /// Updates status, conclusion and output of an existing check run.
    pub async fn update_check_run(
        &self,
        owner: &str,
        repo: &str,
        id: CheckRunId,
        update: &CheckRunUpdate,
    ) -> VcsResult<()> {
        let url = format!(
            "{}/repos/{}/{}/check-runs/{}",
            self.base_api, owner, repo, id
        );
        debug!("GitHub update_check_run: url={}, status={:?}", url, update.status);

        self.http
            .patch(url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_JSON)
            .json(update)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// Percent-encodes every segment of a repository path, keeping separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// GitHub wraps base64 payloads at 60 columns, so whitespace is dropped before decoding.
fn decode_content(path: &str, resp: &GitHubContent) -> VcsResult<Vec<u8>> {
    if resp.encoding != "base64" {
        return Err(VcsError::Decode {
            path: path.to_string(),
            reason: format!("unsupported encoding '{}'", resp.encoding),
        });
    }

    let compact: String = resp
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    STANDARD.decode(compact).map_err(|e| VcsError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct GitHubCompare {
    #[serde(default)]
    files: Vec<CompareFile>,
}

#[derive(Debug, Deserialize)]
struct GitHubContent {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Debug, Deserialize)]
struct GitHubCheckRun {
    id: u64,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::routing::{get, patch, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;
    use crate::errors::ProviderError;
    use crate::types::{CheckConclusion, CheckRunOutput, CheckRunStatus, FileStatus};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base: String) -> GitHubClient {
        GitHubClient::from_config(GitHubConfig {
            base_api: base,
            token: "t0ken".into(),
        })
        .unwrap()
    }

    #[test]
    fn decodes_wrapped_base64() {
        let resp = GitHubContent {
            content: "cHJp\nbnQo\nMSkK\n".into(),
            encoding: "base64".into(),
        };
        assert_eq!(decode_content("a.py", &resp).unwrap(), b"print(1)\n");
    }

    #[test]
    fn rejects_non_base64_encoding() {
        let resp = GitHubContent {
            content: String::new(),
            encoding: "none".into(),
        };
        assert!(matches!(
            decode_content("big.bin", &resp),
            Err(VcsError::Decode { .. })
        ));
    }

    #[test]
    fn encodes_path_segments() {
        assert_eq!(encode_path("src/my file.py"), "src/my%20file.py");
        assert_eq!(encode_path("a/b/c.rs"), "a/b/c.rs");
    }

    #[tokio::test]
    async fn compare_and_content_round_trip_through_api() {
        let app = Router::new()
            .route(
                "/repos/{owner}/{repo}/compare/{range}",
                get(|Path((_, _, range)): Path<(String, String, String)>| async move {
                    assert_eq!(range, "b1...h1");
                    Json(json!({
                        "files": [
                            { "filename": "src/a.py", "status": "modified", "patch": "@@ -1 +1 @@" },
                            { "filename": "old.py", "status": "removed" }
                        ]
                    }))
                }),
            )
            .route(
                "/repos/{owner}/{repo}/contents/{*path}",
                get(
                    |Path((_, _, path)): Path<(String, String, String)>,
                     Query(q): Query<std::collections::HashMap<String, String>>| async move {
                        assert_eq!(path, "src/a.py");
                        assert_eq!(q.get("ref").map(String::as_str), Some("h1"));
                        Json(json!({ "content": "eD0x\n", "encoding": "base64" }))
                    },
                ),
            );
        let gh = client(serve(app).await);

        let files = gh.compare_commits("acme", "shop", "b1", "h1").await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].status, FileStatus::Removed);

        let bytes = gh
            .get_file_content("acme", "shop", "src/a.py", "h1")
            .await
            .unwrap();
        assert_eq!(bytes, b"x=1");
    }

    #[tokio::test]
    async fn check_run_create_then_update() {
        let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
        let app = Router::new()
            .route(
                "/repos/{owner}/{repo}/check-runs",
                post(|State(seen): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push(body);
                    (StatusCode::CREATED, Json(json!({ "id": 42 })))
                }),
            )
            .route(
                "/repos/{owner}/{repo}/check-runs/{id}",
                patch(
                    |State(seen): State<Arc<Mutex<Vec<Value>>>>,
                     Path((_, _, id)): Path<(String, String, u64)>,
                     Json(body): Json<Value>| async move {
                        assert_eq!(id, 42);
                        seen.lock().unwrap().push(body);
                        Json(json!({ "id": 42 }))
                    },
                ),
            )
            .with_state(seen.clone());
        let gh = client(serve(app).await);

        let id = gh
            .create_check_run(
                "acme",
                "shop",
                &NewCheckRun {
                    name: "Spectral scan".into(),
                    head_sha: "h1".into(),
                    base_sha: "b1".into(),
                    status: CheckRunStatus::InProgress,
                },
            )
            .await
            .unwrap();
        assert_eq!(id, CheckRunId(42));

        gh.update_check_run(
            "acme",
            "shop",
            id,
            &CheckRunUpdate::completed(
                CheckConclusion::Success,
                CheckRunOutput {
                    title: "Spectral".into(),
                    summary: "ok".into(),
                    text: String::new(),
                },
            ),
        )
        .await
        .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["status"], "in_progress");
        assert_eq!(seen[0]["base_sha"], "b1");
        assert_eq!(seen[1]["conclusion"], "success");
    }

    #[tokio::test]
    async fn maps_not_found_status() {
        let app = Router::new().route(
            "/repos/{owner}/{repo}/contents/{*path}",
            get(|| async { StatusCode::NOT_FOUND }),
        );
        let gh = client(serve(app).await);

        let err = gh
            .get_file_content("acme", "shop", "gone.py", "h1")
            .await
            .unwrap_err();
        assert!(matches!(err, VcsError::Provider(ProviderError::NotFound)));
    }
}
