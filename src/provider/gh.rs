//! GitHub CLI provider implementation

use crate::error::{Error, Result};
use crate::provider::PrProvider;
use crate::types::{
    ChangeKind, FileChange, MergeMethod, Mergeable, PrState, PullRequest, PullRequestDetails,
    RepositoryRef, Review, ReviewState, StatusCheck,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Fields requested from `gh pr list`.
const LIST_FIELDS: &str =
    "number,title,headRefName,author,state,createdAt,updatedAt,mergeable,labels,url";

/// Fields requested from `gh pr view`.
const DETAIL_FIELDS: &str = "number,title,body,headRefName,baseRefName,author,state,mergeable,\
                             createdAt,updatedAt,labels,url,additions,deletions,changedFiles,\
                             reviewRequests,reviews,statusCheckRollup,files";

/// Explicit `--limit` for unbounded listings; `gh` otherwise stops at 30.
pub const LIST_LIMIT: usize = 1000;

// JSON shapes emitted by `gh ... --json`

#[derive(Deserialize, Default)]
struct GhActor {
    #[serde(default)]
    login: String,
}

#[derive(Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhPullRequest {
    number: u64,
    title: String,
    head_ref_name: String,
    #[serde(default)]
    author: Option<GhActor>,
    state: PrState,
    #[serde(default)]
    mergeable: Mergeable,
    #[serde(default)]
    labels: Vec<GhLabel>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<GhPullRequest> for PullRequest {
    fn from(pr: GhPullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title,
            head_ref: pr.head_ref_name,
            author: pr.author.unwrap_or_default().login,
            state: pr.state,
            mergeable: pr.mergeable,
            labels: pr.labels.into_iter().map(|l| l.name).collect(),
            url: pr.url,
            created_at: pr.created_at,
            updated_at: pr.updated_at,
        }
    }
}

/// Older gh releases nest the reviewer, newer ones flatten it; teams only
/// carry a name.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhReviewRequest {
    #[serde(default)]
    login: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    requested_reviewer: Option<GhActor>,
}

impl GhReviewRequest {
    fn into_login(self) -> Option<String> {
        self.requested_reviewer
            .map(|r| r.login)
            .or(self.login)
            .or(self.name)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhReview {
    #[serde(default)]
    author: Option<GhActor>,
    state: ReviewState,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
}

/// Either a CheckRun (`name`/`status`/`conclusion`/`detailsUrl`) or a
/// StatusContext (`context`/`state`/`targetUrl`).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhStatusCheck {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    details_url: Option<String>,
    #[serde(default)]
    target_url: Option<String>,
}

impl From<GhStatusCheck> for StatusCheck {
    fn from(check: GhStatusCheck) -> Self {
        let state = check
            .conclusion
            .filter(|c| !c.is_empty())
            .or(check.state)
            .or(check.status)
            .unwrap_or_default();
        Self {
            name: check.name.or(check.context).unwrap_or_default(),
            state,
            target_url: check.details_url.or(check.target_url),
        }
    }
}

#[derive(Deserialize)]
struct GhFile {
    path: String,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    status: Option<ChangeKind>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhPullRequestDetails {
    #[serde(flatten)]
    pr: GhPullRequest,
    #[serde(default)]
    body: String,
    base_ref_name: String,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    changed_files: u64,
    #[serde(default)]
    review_requests: Vec<GhReviewRequest>,
    #[serde(default)]
    reviews: Vec<GhReview>,
    #[serde(default)]
    status_check_rollup: Vec<GhStatusCheck>,
    #[serde(default)]
    files: Vec<GhFile>,
}

impl From<GhPullRequestDetails> for PullRequestDetails {
    fn from(d: GhPullRequestDetails) -> Self {
        Self {
            pr: d.pr.into(),
            body: d.body,
            base_ref: d.base_ref_name,
            additions: d.additions,
            deletions: d.deletions,
            changed_files: d.changed_files,
            review_requests: d
                .review_requests
                .into_iter()
                .filter_map(GhReviewRequest::into_login)
                .collect(),
            reviews: d
                .reviews
                .into_iter()
                .map(|r| Review {
                    author: r.author.unwrap_or_default().login,
                    state: r.state,
                    submitted_at: r.submitted_at,
                })
                .collect(),
            status_checks: d.status_check_rollup.into_iter().map(Into::into).collect(),
            files: d
                .files
                .into_iter()
                .map(|f| FileChange {
                    path: f.path,
                    additions: f.additions,
                    deletions: f.deletions,
                    kind: f.status.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct GhRepository {
    name: String,
    owner: GhActor,
}

/// Provider backed by the `gh` executable
pub struct GhCli {
    binary: String,
}

impl GhCli {
    /// Create a provider that runs the given executable
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run `gh` with `args`, returning stdout on success.
    ///
    /// A non-zero exit becomes [`Error::CallFailed`] carrying everything the
    /// process printed.
    async fn run(&self, command: &str, args: &[String]) -> Result<Vec<u8>> {
        debug!(command, ?args, "running gh");
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::CallFailed {
                command: command.to_string(),
                diagnostic: e.to_string(),
            })?;

        if !output.status.success() {
            let mut diagnostic = String::from_utf8_lossy(&output.stdout).into_owned();
            diagnostic.push_str(&String::from_utf8_lossy(&output.stderr));
            debug!(command, status = %output.status, "gh call failed");
            return Err(Error::CallFailed {
                command: command.to_string(),
                diagnostic: diagnostic.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }

    async fn run_json<T: DeserializeOwned>(&self, command: &str, args: &[String]) -> Result<T> {
        let stdout = self.run(command, args).await?;
        parse_json(command, &stdout)
    }
}

fn parse_json<T: DeserializeOwned>(command: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| Error::Parse {
        command: command.to_string(),
        source,
    })
}

fn pr_args(subcommand: &str, number: u64, repo: &RepositoryRef) -> Vec<String> {
    vec![
        "pr".to_string(),
        subcommand.to_string(),
        number.to_string(),
        "--repo".to_string(),
        repo.slug(),
    ]
}

fn pr_list_args(repo: &RepositoryRef) -> Vec<String> {
    vec![
        "pr".to_string(),
        "list".to_string(),
        "--repo".to_string(),
        repo.slug(),
        "--state".to_string(),
        "open".to_string(),
        "--limit".to_string(),
        LIST_LIMIT.to_string(),
        "--json".to_string(),
        LIST_FIELDS.to_string(),
    ]
}

/// A missing or zero `limit` lists up to [`LIST_LIMIT`] repositories.
fn repo_list_args(org: &str, limit: Option<usize>) -> Vec<String> {
    let limit = limit.filter(|l| *l > 0).unwrap_or(LIST_LIMIT);
    vec![
        "repo".to_string(),
        "list".to_string(),
        org.to_string(),
        "--limit".to_string(),
        limit.to_string(),
        "--json".to_string(),
        "name,owner".to_string(),
    ]
}

#[async_trait]
impl PrProvider for GhCli {
    async fn check_available(&self) -> Result<()> {
        let status = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| Error::ProviderUnavailable {
                binary: self.binary.clone(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::ProviderUnavailable {
                binary: self.binary.clone(),
                reason: status.to_string(),
            })
        }
    }

    async fn list_open_prs(&self, repo: &RepositoryRef) -> Result<Vec<PullRequest>> {
        let args = pr_list_args(repo);
        let prs: Vec<GhPullRequest> = self.run_json("gh pr list", &args).await?;
        debug!(repo = %repo, count = prs.len(), "listed PRs");
        Ok(prs.into_iter().map(Into::into).collect())
    }

    async fn get_pr_details(
        &self,
        repo: &RepositoryRef,
        number: u64,
    ) -> Result<PullRequestDetails> {
        let mut args = pr_args("view", number, repo);
        args.extend(["--json".to_string(), DETAIL_FIELDS.to_string()]);
        let details: GhPullRequestDetails = self.run_json("gh pr view", &args).await?;
        Ok(details.into())
    }

    async fn merge_pr(
        &self,
        repo: &RepositoryRef,
        number: u64,
        method: MergeMethod,
        delete_branch: bool,
    ) -> Result<()> {
        let mut args = pr_args("merge", number, repo);
        args.push(method.flag().to_string());
        if delete_branch {
            args.push("--delete-branch".to_string());
        }
        self.run("gh pr merge", &args).await?;
        debug!(repo = %repo, number, %method, delete_branch, "merged PR");
        Ok(())
    }

    async fn approve_pr(&self, repo: &RepositoryRef, number: u64) -> Result<()> {
        let mut args = pr_args("review", number, repo);
        args.push("--approve".to_string());
        self.run("gh pr review --approve", &args).await?;
        Ok(())
    }

    async fn request_changes(
        &self,
        repo: &RepositoryRef,
        number: u64,
        comment: &str,
    ) -> Result<()> {
        let mut args = pr_args("review", number, repo);
        args.push("--request-changes".to_string());
        if !comment.is_empty() {
            args.extend(["--body".to_string(), comment.to_string()]);
        }
        self.run("gh pr review --request-changes", &args).await?;
        Ok(())
    }

    async fn open_in_browser(&self, repo: &RepositoryRef, number: u64) -> Result<()> {
        let mut args = pr_args("view", number, repo);
        args.push("--web".to_string());
        self.run("gh pr view --web", &args).await?;
        Ok(())
    }

    async fn list_org_repos(&self, org: &str, limit: Option<usize>) -> Result<Vec<RepositoryRef>> {
        let args = repo_list_args(org, limit);
        let repos: Vec<GhRepository> = self.run_json("gh repo list", &args).await?;
        debug!(org, count = repos.len(), "listed repositories");
        Ok(repos
            .into_iter()
            .map(|r| RepositoryRef::new(r.owner.login, r.name))
            .collect())
    }
}
