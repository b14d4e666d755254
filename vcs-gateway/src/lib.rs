//! Version-control side of the pull-request scan.
//!
//! * [`events`]  – inbound `pull_request` delivery → [`PullRequestContext`]
//! * [`github`]  – thin REST client (compare, contents, check runs)
//! * [`changes`] – Diff Fetcher: changed files materialized in memory at head

pub mod changes;
pub mod errors;
pub mod events;
pub mod github;
pub mod types;

pub use changes::fetch_changed_files;
pub use errors::{ProviderError, VcsError, VcsResult};
pub use events::{PullRequestAction, PullRequestEvent};
pub use github::{GitHubClient, GitHubConfig};
pub use types::*;
