//! Inbound `pull_request` webhook payload (subset).
//!
//! Only the fields needed to build a [`PullRequestContext`] are modelled;
//! everything else in the delivery is ignored by serde.

use serde::Deserialize;

use crate::errors::{VcsError, VcsResult};
use crate::types::PullRequestContext;

/// Action carried by a `pull_request` delivery.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestAction {
    Opened,
    Reopened,
    Edited,
    Synchronize,
    Closed,
    #[serde(other)]
    Other,
}

impl PullRequestAction {
    /// Actions that produce new head content worth scanning.
    pub fn triggers_scan(self) -> bool {
        matches!(
            self,
            Self::Opened | Self::Reopened | Self::Edited | Self::Synchronize
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub action: PullRequestAction,
    pub pull_request: EventPullRequest,
    pub repository: EventRepository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventPullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub html_url: String,
    pub base: EventRef,
    pub head: EventRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRef {
    #[serde(rename = "ref")]
    pub r#ref: String,
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRepository {
    pub full_name: String,
    pub html_url: String,
}

impl PullRequestEvent {
    /// Builds the immutable scan context for this delivery.
    pub fn to_context(&self) -> VcsResult<PullRequestContext> {
        let (owner, repo) = split_owner_repo(&self.repository.full_name)?;
        let pr = &self.pull_request;

        Ok(PullRequestContext {
            owner,
            repo,
            number: pr.number,
            title: pr.title.clone(),
            html_url: pr.html_url.clone(),
            base_sha: pr.base.sha.clone(),
            head_sha: pr.head.sha.clone(),
            head_ref: pr.head.r#ref.clone(),
            repo_url: self.repository.html_url.clone(),
        })
    }
}

/// Splits "owner/repo" into components or returns a validation error.
pub fn split_owner_repo(full_name: &str) -> VcsResult<(String, String)> {
    let mut parts = full_name.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let repo = parts.next().unwrap_or("").trim();

    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return Err(VcsError::Validation(format!(
            "invalid repository name '{full_name}', expected 'owner/repo'"
        )));
    }

    Ok((owner.to_string(), repo.to_string()))
}
