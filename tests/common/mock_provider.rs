//! Mock PR provider for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use shippr::error::{Error, Result};
use shippr::provider::PrProvider;
use shippr::types::{MergeMethod, PullRequest, PullRequestDetails, RepositoryRef};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCall {
    pub number: u64,
    pub method: MergeMethod,
    pub delete_branch: bool,
}

/// Call record for `approve_pr` / `request_changes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCall {
    Approve(u64),
    RequestChanges(u64, String),
}

/// Hand-written mock implementing `PrProvider`
///
/// Features:
/// - Configurable responses per repository and per PR
/// - Call tracking for verification
/// - Error injection for failure path testing
/// - Optional per-call delay with in-flight / peak counters
#[derive(Default)]
pub struct MockProvider {
    prs: Mutex<HashMap<RepositoryRef, Vec<PullRequest>>>,
    details: Mutex<HashMap<u64, PullRequestDetails>>,
    org_repos: Mutex<Vec<RepositoryRef>>,
    delay: Mutex<Option<Duration>>,
    // Concurrency tracking
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    // Call tracking
    list_calls: Mutex<Vec<RepositoryRef>>,
    details_calls: Mutex<Vec<u64>>,
    merge_calls: Mutex<Vec<MergeCall>>,
    review_calls: Mutex<Vec<ReviewCall>>,
    browser_calls: Mutex<Vec<u64>>,
    // Error injection
    error_on_available: Mutex<Option<String>>,
    error_on_list: Mutex<HashMap<RepositoryRef, String>>,
    error_on_list_repos: Mutex<Option<String>>,
    error_on_details: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
    error_on_review: Mutex<Option<String>>,
    error_on_browser: Mutex<Option<String>>,
}

fn injected(command: &str, msg: &str) -> Error {
    Error::CallFailed {
        command: command.to_string(),
        diagnostic: msg.to_string(),
    }
}

/// Decrements the in-flight counter when a call ends
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockProvider {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    // === Response setup ===

    /// Set the open PRs returned for `repo`
    pub fn set_prs(&self, repo: &RepositoryRef, prs: Vec<PullRequest>) {
        self.prs.lock().unwrap().insert(repo.clone(), prs);
    }

    /// Set the details returned for PR `number`
    pub fn set_details(&self, details: PullRequestDetails) {
        self.details
            .lock()
            .unwrap()
            .insert(details.pr.number, details);
    }

    /// Set the repositories returned by `list_org_repos`
    pub fn set_org_repos(&self, repos: Vec<RepositoryRef>) {
        *self.org_repos.lock().unwrap() = repos;
    }

    /// Delay every call by `delay`
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Set up `repo` with `prs` and details for each of them
    pub fn setup_repo(&self, repo: &RepositoryRef, prs: Vec<PullRequest>) {
        for pr in &prs {
            self.set_details(crate::common::make_details(pr.clone()));
        }
        self.set_prs(repo, prs);
    }

    // === Error injection ===

    /// Make `check_available` fail
    pub fn fail_available(&self, msg: &str) {
        *self.error_on_available.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_open_prs` fail for `repo`
    pub fn fail_list(&self, repo: &RepositoryRef, msg: &str) {
        self.error_on_list
            .lock()
            .unwrap()
            .insert(repo.clone(), msg.to_string());
    }

    /// Make `list_org_repos` fail
    pub fn fail_list_repos(&self, msg: &str) {
        *self.error_on_list_repos.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `get_pr_details` fail
    pub fn fail_details(&self, msg: &str) {
        *self.error_on_details.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pr` fail
    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `approve_pr` and `request_changes` fail
    pub fn fail_review(&self, msg: &str) {
        *self.error_on_review.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `open_in_browser` fail
    pub fn fail_browser(&self, msg: &str) {
        *self.error_on_browser.lock().unwrap() = Some(msg.to_string());
    }

    // === Call inspection ===

    pub fn get_list_calls(&self) -> Vec<RepositoryRef> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn get_details_calls(&self) -> Vec<u64> {
        self.details_calls.lock().unwrap().clone()
    }

    pub fn get_merge_calls(&self) -> Vec<MergeCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn get_review_calls(&self) -> Vec<ReviewCall> {
        self.review_calls.lock().unwrap().clone()
    }

    pub fn get_browser_calls(&self) -> Vec<u64> {
        self.browser_calls.lock().unwrap().clone()
    }

    /// Highest number of calls that were in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        guard
    }
}

#[async_trait]
impl PrProvider for MockProvider {
    async fn check_available(&self) -> Result<()> {
        match self.error_on_available.lock().unwrap().clone() {
            Some(reason) => Err(Error::ProviderUnavailable {
                binary: "gh".to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    async fn list_open_prs(&self, repo: &RepositoryRef) -> Result<Vec<PullRequest>> {
        self.list_calls.lock().unwrap().push(repo.clone());
        let _guard = self.enter().await;

        if let Some(msg) = self.error_on_list.lock().unwrap().get(repo) {
            return Err(injected("gh pr list", msg));
        }
        Ok(self
            .prs
            .lock()
            .unwrap()
            .get(repo)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_pr_details(&self, _repo: &RepositoryRef, number: u64) -> Result<PullRequestDetails> {
        self.details_calls.lock().unwrap().push(number);
        let _guard = self.enter().await;

        if let Some(msg) = self.error_on_details.lock().unwrap().clone() {
            return Err(injected("gh pr view", &msg));
        }
        self.details
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .ok_or_else(|| injected("gh pr view", &format!("no pull requests found for #{number}")))
    }

    async fn merge_pr(
        &self,
        _repo: &RepositoryRef,
        number: u64,
        method: MergeMethod,
        delete_branch: bool,
    ) -> Result<()> {
        self.merge_calls.lock().unwrap().push(MergeCall {
            number,
            method,
            delete_branch,
        });
        let _guard = self.enter().await;

        match self.error_on_merge.lock().unwrap().clone() {
            Some(msg) => Err(injected("gh pr merge", &msg)),
            None => Ok(()),
        }
    }

    async fn approve_pr(&self, _repo: &RepositoryRef, number: u64) -> Result<()> {
        self.review_calls
            .lock()
            .unwrap()
            .push(ReviewCall::Approve(number));
        let _guard = self.enter().await;

        match self.error_on_review.lock().unwrap().clone() {
            Some(msg) => Err(injected("gh pr review", &msg)),
            None => Ok(()),
        }
    }

    async fn request_changes(&self, _repo: &RepositoryRef, number: u64, comment: &str) -> Result<()> {
        self.review_calls
            .lock()
            .unwrap()
            .push(ReviewCall::RequestChanges(number, comment.to_string()));
        let _guard = self.enter().await;

        match self.error_on_review.lock().unwrap().clone() {
            Some(msg) => Err(injected("gh pr review", &msg)),
            None => Ok(()),
        }
    }

    async fn open_in_browser(&self, _repo: &RepositoryRef, number: u64) -> Result<()> {
        self.browser_calls.lock().unwrap().push(number);
        let _guard = self.enter().await;

        match self.error_on_browser.lock().unwrap().clone() {
            Some(msg) => Err(injected("gh pr view --web", &msg)),
            None => Ok(()),
        }
    }

    async fn list_org_repos(&self, _org: &str, limit: Option<usize>) -> Result<Vec<RepositoryRef>> {
        if let Some(msg) = self.error_on_list_repos.lock().unwrap().clone() {
            return Err(injected("gh repo list", &msg));
        }
        let repos = self.org_repos.lock().unwrap().clone();
        Ok(match limit {
            Some(limit) => repos.into_iter().take(limit).collect(),
            None => repos,
        })
    }
}
