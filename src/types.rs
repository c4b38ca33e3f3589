//! Core types for shippr

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A repository reference (owner + name)
///
/// The `owner/name` slug produced by `Display` is the only identifier
/// handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepositoryRef {
    /// Build a reference from its two parts
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// The canonical `owner/name` slug
    pub fn slug(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(Error::InvalidRepository(s.to_string())),
        }
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrState {
    /// PR is open and can be merged
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Merged => write!(f, "MERGED"),
        }
    }
}

/// Whether the PR can be merged without conflicts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mergeable {
    /// No conflicts with the base branch
    Mergeable,
    /// Conflicts with the base branch
    Conflicting,
    /// GitHub has not computed it yet
    #[default]
    #[serde(other)]
    Unknown,
}

/// A pull request as returned by the list call
///
/// Immutable snapshot; refreshed only by fetching again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number, unique within its repository
    pub number: u64,
    /// PR title
    pub title: String,
    /// Head (source) branch name
    pub head_ref: String,
    /// Author login
    pub author: String,
    /// Lifecycle state
    pub state: PrState,
    /// Mergeability indicator
    pub mergeable: Mergeable,
    /// Label names
    pub labels: Vec<String>,
    /// Web URL for the PR
    pub url: Option<String>,
    /// When the PR was opened
    pub created_at: Option<DateTime<Utc>>,
    /// When the PR was last updated
    pub updated_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Open but conflicting with its base
    pub fn is_conflicting(&self) -> bool {
        self.state == PrState::Open && self.mergeable == Mergeable::Conflicting
    }
}

/// Kind of change applied to a file in a PR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// New file
    Added,
    /// Existing file changed
    Modified,
    /// File deleted
    Removed,
    /// File moved
    Renamed,
    /// Provider did not say
    #[default]
    #[serde(other)]
    Unknown,
}

/// A file touched by a PR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the repository root
    pub path: String,
    /// Lines added
    pub additions: u64,
    /// Lines removed
    pub deletions: u64,
    /// Change kind
    pub kind: ChangeKind,
}

/// State of a submitted review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    /// Reviewer approved
    Approved,
    /// Reviewer requested changes
    ChangesRequested,
    /// Reviewer only commented
    Commented,
    /// Review was dismissed
    Dismissed,
    /// Review not yet submitted
    Pending,
    /// Anything GitHub adds later
    #[serde(other)]
    Other,
}

/// A review entry on a PR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Reviewer login
    pub author: String,
    /// Review verdict
    pub state: ReviewState,
    /// Submission time
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A CI status check or check run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheck {
    /// Check name or status context
    pub name: String,
    /// Conclusion if finished, otherwise the raw status
    pub state: String,
    /// Link to the check details
    pub target_url: Option<String>,
}

/// Extended PR details for the inspection view
///
/// Fetched lazily when the operator drills into one PR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDetails {
    /// The list-level fields
    pub pr: PullRequest,
    /// PR description
    pub body: String,
    /// Base (target) branch
    pub base_ref: String,
    /// Total lines added
    pub additions: u64,
    /// Total lines removed
    pub deletions: u64,
    /// Number of changed files
    pub changed_files: u64,
    /// Logins of requested reviewers
    pub review_requests: Vec<String>,
    /// Submitted reviews
    pub reviews: Vec<Review>,
    /// CI checks
    pub status_checks: Vec<StatusCheck>,
    /// Changed files
    pub files: Vec<FileChange>,
}

/// Merge strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto base branch
    Rebase,
    /// Create a merge commit
    Merge,
}

impl MergeMethod {
    /// All strategies in the order they are offered
    pub const ALL: [Self; 3] = [Self::Squash, Self::Rebase, Self::Merge];

    /// The `gh pr merge` flag for this strategy
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Squash => "--squash",
            Self::Rebase => "--rebase",
            Self::Merge => "--merge",
        }
    }
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Rebase => write!(f, "rebase"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// One (repository, open PR) pair produced by the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRow {
    /// Repository the PR belongs to
    pub repo: RepositoryRef,
    /// The open PR
    pub pr: PullRequest,
}
