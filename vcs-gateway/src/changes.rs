//! Reconstructs the changed files of a pull request as they exist at head.

use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use crate::errors::VcsResult;
use crate::github::GitHubClient;
use crate::types::{ChangedFile, CompareFile, FileStatus, PullRequestContext};

/// Fetches every non-deleted file touched by the pull request.
///
/// All content requests run concurrently and are joined before returning.
/// The first failing request aborts the whole fetch: no partial list is
/// ever handed to the materializer. Order of the result is not significant.
#[instrument(
    name = "fetch_changed_files",
    skip(client, ctx),
    fields(repo = %ctx.full_name(), pr = ctx.number)
)]
pub async fn fetch_changed_files(
    client: &GitHubClient,
    ctx: &PullRequestContext,
) -> VcsResult<Vec<ChangedFile>> {
    let files = client
        .compare_commits(&ctx.owner, &ctx.repo, &ctx.base_sha, &ctx.head_sha)
        .await?;

    let present = retain_present(files);
    debug!(files = present.len(), "comparison resolved");

    let fetches = present.into_iter().map(|file| async move {
        let content = client
            .get_file_content(&ctx.owner, &ctx.repo, &file.filename, &ctx.head_sha)
            .await?;

        Ok::<_, crate::errors::VcsError>(ChangedFile {
            path: file.filename,
            line_map: file.patch,
            content,
        })
    });

    let changes = try_join_all(fetches).await?;
    info!(files = changes.len(), "changed files fetched at head");

    Ok(changes)
}

/// Drops entries that no longer exist at head.
fn retain_present(files: Vec<CompareFile>) -> Vec<CompareFile> {
    files
        .into_iter()
        .filter(|f| f.status != FileStatus::Removed)
        .collect()
}
