//! Provider gateway for pull request operations
//!
//! The workflow and the aggregator only talk to [`PrProvider`]; the
//! production implementation shells out to the GitHub CLI.

mod gh;

pub use gh::GhCli;

use crate::error::{Error, Result};
use crate::types::{MergeMethod, PullRequest, PullRequestDetails, RepositoryRef};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Provider trait for PR operations
///
/// Every method is a single out-of-process call. Callers bound each call
/// with [`with_deadline`].
#[async_trait]
pub trait PrProvider: Send + Sync {
    /// Check that the provider can be invoked at all
    async fn check_available(&self) -> Result<()>;

    /// List open PRs for a repository, in provider order
    async fn list_open_prs(&self, repo: &RepositoryRef) -> Result<Vec<PullRequest>>;

    /// Get full PR details (files, reviews, checks)
    async fn get_pr_details(&self, repo: &RepositoryRef, number: u64)
    -> Result<PullRequestDetails>;

    /// Merge a PR with the given strategy, optionally deleting its branch
    async fn merge_pr(
        &self,
        repo: &RepositoryRef,
        number: u64,
        method: MergeMethod,
        delete_branch: bool,
    ) -> Result<()>;

    /// Submit an approving review
    async fn approve_pr(&self, repo: &RepositoryRef, number: u64) -> Result<()>;

    /// Submit a "changes requested" review with the given body
    async fn request_changes(&self, repo: &RepositoryRef, number: u64, comment: &str)
    -> Result<()>;

    /// Open the PR in the operator's browser
    async fn open_in_browser(&self, repo: &RepositoryRef, number: u64) -> Result<()>;

    /// List repositories owned by an organization or user
    async fn list_org_repos(&self, org: &str, limit: Option<usize>) -> Result<Vec<RepositoryRef>>;
}

/// Run a provider call, failing with [`Error::Timeout`] once `deadline` passes.
///
/// Dropping the call future on expiry also kills the child process.
pub async fn with_deadline<T, F>(operation: &str, deadline: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .unwrap_or_else(|_| {
            Err(Error::Timeout {
                operation: operation.to_string(),
                after: deadline,
            })
        })
}
