//! Organization-wide open PR listing
//!
//! Fans one `list_open_prs` call out per repository, at most
//! [`concurrency_cap`] at a time. A repository whose call fails is left
//! out of the result; only the initial repository listing can fail the
//! whole aggregation.

use crate::error::Result;
use crate::provider::{PrProvider, with_deadline};
use crate::types::{AggregationRow, RepositoryRef};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};
use tracing::debug;

/// Lower bound for the concurrency cap; list calls wait on a subprocess,
/// not on a CPU.
pub const MIN_CONCURRENCY: usize = 4;

/// `max(available parallelism, MIN_CONCURRENCY)`
pub fn concurrency_cap() -> usize {
    thread::available_parallelism()
        .map_or(1, std::num::NonZeroUsize::get)
        .max(MIN_CONCURRENCY)
}

/// List every open PR across an organization's repositories.
///
/// `repo_limit` caps how many repositories are listed; `None` or zero
/// lists them all. Rows come back in no particular order.
pub async fn list_open_prs_for_org(
    provider: Arc<dyn PrProvider>,
    org: &str,
    repo_limit: Option<usize>,
    deadline: Duration,
) -> Result<Vec<AggregationRow>> {
    aggregate_with_cap(provider, org, repo_limit, deadline, concurrency_cap()).await
}

/// [`list_open_prs_for_org`] with an explicit concurrency cap.
pub async fn aggregate_with_cap(
    provider: Arc<dyn PrProvider>,
    org: &str,
    repo_limit: Option<usize>,
    deadline: Duration,
    cap: usize,
) -> Result<Vec<AggregationRow>> {
    // Zero means no cap
    let repo_limit = repo_limit.filter(|l| *l > 0);
    let repos = with_deadline(
        "listing repositories",
        deadline,
        provider.list_org_repos(org, repo_limit),
    )
    .await?;
    debug!(org, repos = repos.len(), cap, "aggregating open PRs");

    let gate = Arc::new(Semaphore::new(cap.max(1)));
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<AggregationRow>>();

    for repo in repos {
        let provider = Arc::clone(&provider);
        let gate = Arc::clone(&gate);
        let tx = tx.clone();
        tokio::spawn(async move {
            let Ok(_permit) = gate.acquire_owned().await else {
                return;
            };
            match with_deadline("listing pull requests", deadline, provider.list_open_prs(&repo))
                .await
            {
                Ok(prs) => {
                    let rows = prs
                        .into_iter()
                        .map(|pr| AggregationRow {
                            repo: repo.clone(),
                            pr,
                        })
                        .collect();
                    let _ = tx.send(rows);
                }
                Err(e) => {
                    debug!(repo = %repo, error = %e, "dropping repository from aggregation");
                }
            }
        });
    }
    // Consumer stops once every task has dropped its sender
    drop(tx);

    let mut rows = Vec::new();
    while let Some(batch) = rx.recv().await {
        rows.extend(batch);
    }
    Ok(rows)
}

/// Repositories that contributed at least one row, sorted.
pub fn repositories_with_rows(rows: &[AggregationRow]) -> Vec<&RepositoryRef> {
    let mut repos: Vec<&RepositoryRef> = rows.iter().map(|r| &r.repo).collect();
    repos.sort();
    repos.dedup();
    repos
}
