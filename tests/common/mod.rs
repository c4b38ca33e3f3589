//! Shared test helpers

#![allow(dead_code)]

pub mod mock_provider;

pub use mock_provider::{MergeCall, MockProvider, ReviewCall};

use shippr::types::{
    ChangeKind, FileChange, Mergeable, PrState, PullRequest, PullRequestDetails, RepositoryRef,
};

/// `acme/<name>`
pub fn repo(name: &str) -> RepositoryRef {
    RepositoryRef::new("acme", name)
}

/// An open, mergeable PR
pub fn make_pr(number: u64, title: &str, head_ref: &str) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        head_ref: head_ref.to_string(),
        author: "octocat".to_string(),
        state: PrState::Open,
        mergeable: Mergeable::Mergeable,
        labels: vec![],
        url: Some(format!("https://github.com/acme/api/pull/{number}")),
        created_at: None,
        updated_at: None,
    }
}

/// Details for `pr` with one modified file and no reviews
pub fn make_details(pr: PullRequest) -> PullRequestDetails {
    PullRequestDetails {
        pr,
        body: "Fixes the thing".to_string(),
        base_ref: "main".to_string(),
        additions: 10,
        deletions: 2,
        changed_files: 1,
        review_requests: vec![],
        reviews: vec![],
        status_checks: vec![],
        files: vec![FileChange {
            path: "src/lib.rs".to_string(),
            additions: 10,
            deletions: 2,
            kind: ChangeKind::Modified,
        }],
    }
}
