//! Provider-agnostic data model for a pull-request scan and its check run.

use serde::{Deserialize, Serialize};

/// Identity of one scan unit: a pull request between two commits.
///
/// Built once from the inbound event and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestContext {
    /// Repository owner (user or organization login).
    pub owner: String,
    /// Repository name without the owner part.
    pub repo: String,
    /// Pull request number.
    pub number: u64,
    /// Pull request title, used in the check-run report.
    pub title: String,
    /// Web URL of the pull request.
    pub html_url: String,
    /// Commit the pull request is based on.
    pub base_sha: String,
    /// Commit at the tip of the pull request branch.
    pub head_sha: String,
    /// Name of the pull request branch.
    pub head_ref: String,
    /// Web URL of the repository, e.g. `https://github.com/acme/api`.
    pub repo_url: String,
}

impl PullRequestContext {
    /// Returns `owner/repo`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// A file touched by the pull request, with its content at head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Repository-relative path (forward slashes).
    pub path: String,
    /// Unified diff hunks reported by the provider, when available.
    pub line_map: Option<String>,
    /// Decoded file bytes at the head commit.
    pub content: Vec<u8>,
}

/// Status of a file entry in a commit comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Removed,
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

/// One file entry of a commit comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareFile {
    pub filename: String,
    pub status: FileStatus,
    #[serde(default)]
    pub patch: Option<String>,
}

/// Provider-side identifier of a check run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CheckRunId(pub u64);

impl std::fmt::Display for CheckRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    Queued,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    Success,
    Failure,
}

/// Rendered report attached to a completed check run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckRunOutput {
    pub title: String,
    pub summary: String,
    pub text: String,
}

/// Request body for creating a check run.
#[derive(Debug, Clone, Serialize)]
pub struct NewCheckRun {
    pub name: String,
    pub head_sha: String,
    /// Base commit of the compared range, shown alongside the head.
    pub base_sha: String,
    pub status: CheckRunStatus,
}

/// Request body for updating a check run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRunUpdate {
    pub status: CheckRunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<CheckConclusion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<CheckRunOutput>,
}

impl CheckRunUpdate {
    /// Terminal update: `completed` with the given conclusion and report.
    pub fn completed(conclusion: CheckConclusion, output: CheckRunOutput) -> Self {
        Self {
            status: CheckRunStatus::Completed,
            conclusion: Some(conclusion),
            output: Some(output),
        }
    }
}
