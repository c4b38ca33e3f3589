//! Workflow session - the pure state machine
//!
//! No I/O happens here. [`Session::update`] consumes one [`Event`] and
//! returns at most one [`Effect`] for the driver to perform; the result of
//! that effect comes back later as another event.

use crate::config::DEFAULT_REVIEW_COMMENT;
use crate::error::Error;
use crate::types::{MergeMethod, PullRequest, PullRequestDetails, RepositoryRef};
use tracing::debug;

/// Knobs that change the shape of the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Fetch and show PR details before the merge prompts.
    /// When false, choosing a PR goes straight to the browser prompt.
    pub inspect: bool,
    /// Body posted with "request changes" reviews
    pub review_comment: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            inspect: true,
            review_comment: DEFAULT_REVIEW_COMMENT.to_string(),
        }
    }
}

/// Review verdicts available from the details view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    /// Approve the PR
    Approve,
    /// Request changes
    RequestChanges,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The merge went through
    Completed,
    /// The repository had no open PRs
    Empty,
    /// The operator quit
    Quit,
    /// A provider call failed
    Failed,
}

/// Terminal status of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Outcome category
    pub kind: OutcomeKind,
    /// Operator-facing status line
    pub message: String,
}

impl Outcome {
    /// Whether the process should exit non-zero
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, OutcomeKind::Failed)
    }
}

/// Current stage, with the data that only exists in that stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Waiting for the PR list
    Fetching,
    /// Choosing a PR; `loading` holds the pick while its details are fetched
    Selecting {
        /// PR whose details are in flight
        loading: Option<PullRequest>,
    },
    /// Inspecting one PR
    ViewingDetails {
        /// The selected PR
        pr: PullRequest,
        /// Its details
        details: Box<PullRequestDetails>,
        /// Review call in flight, if any
        submitting: Option<ReviewAction>,
    },
    /// "Open in browser before merging?"
    ConfirmOpenInBrowser {
        /// The selected PR
        pr: PullRequest,
        /// Browser call in flight
        opening: bool,
    },
    /// Choosing squash / rebase / merge
    PickingStrategy {
        /// The selected PR
        pr: PullRequest,
    },
    /// "Delete branch after merging?"
    ConfirmDeleteBranch {
        /// The selected PR
        pr: PullRequest,
        /// Chosen strategy
        strategy: MergeMethod,
    },
    /// Merge call in flight
    Merging {
        /// The selected PR
        pr: PullRequest,
        /// Chosen strategy
        strategy: MergeMethod,
        /// Whether the head branch is deleted after merging
        delete_branch: bool,
    },
    /// Terminal
    Done(Outcome),
}

impl Stage {
    /// Short stage name for logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Selecting { .. } => "selecting",
            Self::ViewingDetails { .. } => "viewing-details",
            Self::ConfirmOpenInBrowser { .. } => "confirm-open",
            Self::PickingStrategy { .. } => "picking-strategy",
            Self::ConfirmDeleteBranch { .. } => "confirm-delete",
            Self::Merging { .. } => "merging",
            Self::Done(_) => "done",
        }
    }
}

/// Operator input, already decoded from keys or prompt answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Confirm the PR at this index of the fetched list
    Choose(usize),
    /// Approve the PR being viewed
    Approve,
    /// Request changes on the PR being viewed
    RequestChanges,
    /// Continue from the details view to the merge prompts
    Proceed,
    /// Back from the details view to the list
    Back,
    /// Affirmative answer to a yes/no prompt
    Yes,
    /// Negative answer to a yes/no prompt
    No,
    /// Pick a merge strategy
    Strategy(MergeMethod),
    /// Leave immediately
    Quit,
}

/// Everything that can move the state machine
#[derive(Debug)]
pub enum Event {
    /// Operator input
    Input(Input),
    /// Result of [`Effect::FetchPrs`]
    PrsFetched(Result<Vec<PullRequest>, Error>),
    /// Result of [`Effect::FetchDetails`]
    DetailsFetched(Result<PullRequestDetails, Error>),
    /// Result of [`Effect::Approve`] or [`Effect::RequestChanges`]
    Reviewed(Result<(), Error>),
    /// [`Effect::OpenInBrowser`] finished; its outcome is never surfaced
    BrowserClosed,
    /// Result of [`Effect::Merge`]
    Merged(Result<(), Error>),
}

impl Event {
    /// Whether this event completes a provider call
    pub const fn is_completion(&self) -> bool {
        !matches!(self, Self::Input(_))
    }
}

/// A provider call requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// List open PRs
    FetchPrs,
    /// Fetch details for one PR
    FetchDetails {
        /// PR number
        number: u64,
    },
    /// Approve a PR
    Approve {
        /// PR number
        number: u64,
    },
    /// Request changes on a PR
    RequestChanges {
        /// PR number
        number: u64,
        /// Review body
        comment: String,
    },
    /// Open a PR in the browser
    OpenInBrowser {
        /// PR number
        number: u64,
    },
    /// Merge a PR
    Merge {
        /// PR number
        number: u64,
        /// Strategy
        strategy: MergeMethod,
        /// Delete the head branch afterwards
        delete_branch: bool,
    },
}

impl Effect {
    /// Spinner text while the call is in flight
    pub fn description(&self) -> String {
        match self {
            Self::FetchPrs => "Fetching pull requests...".to_string(),
            Self::FetchDetails { number } => format!("Fetching details for PR #{number}..."),
            Self::Approve { number } => format!("Approving PR #{number}..."),
            Self::RequestChanges { number, .. } => {
                format!("Requesting changes on PR #{number}...")
            }
            Self::OpenInBrowser { number } => format!("Opening PR #{number} in browser..."),
            Self::Merge { number, .. } => format!("Merging PR #{number}..."),
        }
    }
}

/// The one workflow session of a process run
#[derive(Debug, Clone)]
pub struct Session {
    repo: RepositoryRef,
    options: SessionOptions,
    stage: Stage,
    prs: Vec<PullRequest>,
    status: Option<String>,
}

impl Session {
    /// Create a session in [`Stage::Fetching`] together with the fetch that
    /// must be dispatched first.
    pub fn start(repo: RepositoryRef, options: SessionOptions) -> (Self, Effect) {
        let session = Self {
            repo,
            options,
            stage: Stage::Fetching,
            prs: Vec::new(),
            status: None,
        };
        (session, Effect::FetchPrs)
    }

    /// Target repository
    pub const fn repo(&self) -> &RepositoryRef {
        &self.repo
    }

    /// Session options
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Current stage
    pub const fn stage(&self) -> &Stage {
        &self.stage
    }

    /// PRs from the last successful fetch (empty before it completes)
    pub fn prs(&self) -> &[PullRequest] {
        &self.prs
    }

    /// Last status message
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The PR the operator has picked, if any
    pub const fn selected(&self) -> Option<&PullRequest> {
        match &self.stage {
            Stage::Selecting { loading } => loading.as_ref(),
            Stage::ViewingDetails { pr, .. }
            | Stage::ConfirmOpenInBrowser { pr, .. }
            | Stage::PickingStrategy { pr }
            | Stage::ConfirmDeleteBranch { pr, .. }
            | Stage::Merging { pr, .. } => Some(pr),
            Stage::Fetching | Stage::Done(_) => None,
        }
    }

    /// Details of the PR being viewed
    pub fn details(&self) -> Option<&PullRequestDetails> {
        match &self.stage {
            Stage::ViewingDetails { details, .. } => Some(&**details),
            _ => None,
        }
    }

    /// Chosen merge strategy
    pub const fn strategy(&self) -> Option<MergeMethod> {
        match &self.stage {
            Stage::ConfirmDeleteBranch { strategy, .. } | Stage::Merging { strategy, .. } => {
                Some(*strategy)
            }
            _ => None,
        }
    }

    /// Branch deletion decision (only known while merging)
    pub const fn delete_branch(&self) -> Option<bool> {
        match &self.stage {
            Stage::Merging { delete_branch, .. } => Some(*delete_branch),
            _ => None,
        }
    }

    /// Terminal outcome, once reached
    pub const fn outcome(&self) -> Option<&Outcome> {
        match &self.stage {
            Stage::Done(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Whether the session has ended
    pub const fn is_done(&self) -> bool {
        matches!(self.stage, Stage::Done(_))
    }

    /// Whether a provider call is outstanding
    pub const fn is_busy(&self) -> bool {
        matches!(
            self.stage,
            Stage::Fetching
                | Stage::Selecting { loading: Some(_) }
                | Stage::ViewingDetails {
                    submitting: Some(_),
                    ..
                }
                | Stage::ConfirmOpenInBrowser { opening: true, .. }
                | Stage::Merging { .. }
        )
    }

    /// Apply one event.
    ///
    /// Events that mean nothing in the active stage leave the session
    /// untouched. `Quit` ends any non-terminal stage.
    pub fn update(&mut self, event: Event) -> Option<Effect> {
        if self.is_done() {
            debug!(?event, "ignoring event after session end");
            return None;
        }

        let stage = std::mem::replace(&mut self.stage, Stage::Fetching);
        let from = stage.name();
        let (next, effect) = self.transition(stage, event);
        if next.name() != from {
            debug!(from, to = next.name(), "workflow transition");
        }
        self.stage = next;
        effect
    }

    #[allow(clippy::too_many_lines)]
    fn transition(&mut self, stage: Stage, event: Event) -> (Stage, Option<Effect>) {
        match (stage, event) {
            (_, Event::Input(Input::Quit)) => (self.finish(OutcomeKind::Quit, "Quit"), None),

            // Fetching
            (Stage::Fetching, Event::PrsFetched(Ok(prs))) => {
                if prs.is_empty() {
                    let message = format!("No open pull requests found for {}", self.repo);
                    (self.finish(OutcomeKind::Empty, message), None)
                } else {
                    self.prs = prs;
                    self.status = None;
                    (Stage::Selecting { loading: None }, None)
                }
            }
            (Stage::Fetching, Event::PrsFetched(Err(e))) => (
                self.finish(OutcomeKind::Failed, format!("Failed to fetch PRs: {e}")),
                None,
            ),

            // Selecting
            (Stage::Selecting { loading: None }, Event::Input(Input::Choose(index))) => {
                match self.prs.get(index).cloned() {
                    Some(pr) if self.options.inspect => {
                        let number = pr.number;
                        self.status = Some("Fetching PR details...".to_string());
                        (
                            Stage::Selecting { loading: Some(pr) },
                            Some(Effect::FetchDetails { number }),
                        )
                    }
                    Some(pr) => (Stage::ConfirmOpenInBrowser { pr, opening: false }, None),
                    None => (Stage::Selecting { loading: None }, None),
                }
            }
            (Stage::Selecting { loading: Some(pr) }, Event::DetailsFetched(Ok(details))) => {
                self.status = None;
                (
                    Stage::ViewingDetails {
                        pr,
                        details: Box::new(details),
                        submitting: None,
                    },
                    None,
                )
            }
            (Stage::Selecting { loading: Some(_) }, Event::DetailsFetched(Err(e))) => (
                self.finish(
                    OutcomeKind::Failed,
                    format!("Failed to fetch PR details: {e}"),
                ),
                None,
            ),

            // Viewing details
            (
                Stage::ViewingDetails {
                    pr,
                    details,
                    submitting: None,
                },
                Event::Input(input @ (Input::Approve | Input::RequestChanges)),
            ) => {
                let number = pr.number;
                let (action, effect) = if input == Input::Approve {
                    self.status = Some("Approving PR...".to_string());
                    (ReviewAction::Approve, Effect::Approve { number })
                } else {
                    self.status = Some("Requesting changes...".to_string());
                    (
                        ReviewAction::RequestChanges,
                        Effect::RequestChanges {
                            number,
                            comment: self.options.review_comment.clone(),
                        },
                    )
                };
                (
                    Stage::ViewingDetails {
                        pr,
                        details,
                        submitting: Some(action),
                    },
                    Some(effect),
                )
            }
            (
                Stage::ViewingDetails {
                    pr,
                    submitting: None,
                    ..
                },
                Event::Input(Input::Proceed),
            ) => (Stage::ConfirmOpenInBrowser { pr, opening: false }, None),
            (
                Stage::ViewingDetails {
                    submitting: None, ..
                },
                Event::Input(Input::Back),
            ) => (Stage::Selecting { loading: None }, None),
            (
                Stage::ViewingDetails {
                    pr,
                    submitting: Some(_),
                    ..
                },
                Event::Reviewed(Ok(())),
            ) => {
                self.status = Some("Review submitted successfully!".to_string());
                (Stage::ConfirmOpenInBrowser { pr, opening: false }, None)
            }
            (
                Stage::ViewingDetails {
                    submitting: Some(_),
                    ..
                },
                Event::Reviewed(Err(e)),
            ) => (
                self.finish(OutcomeKind::Failed, format!("Review action failed: {e}")),
                None,
            ),

            // Open in browser?
            (Stage::ConfirmOpenInBrowser { pr, opening: false }, Event::Input(Input::Yes)) => {
                let number = pr.number;
                self.status = Some("Opening PR in browser...".to_string());
                (
                    Stage::ConfirmOpenInBrowser { pr, opening: true },
                    Some(Effect::OpenInBrowser { number }),
                )
            }
            (Stage::ConfirmOpenInBrowser { pr, opening: false }, Event::Input(Input::No))
            | (Stage::ConfirmOpenInBrowser { pr, opening: true }, Event::BrowserClosed) => {
                (Stage::PickingStrategy { pr }, None)
            }

            // Strategy
            (Stage::PickingStrategy { pr }, Event::Input(Input::Strategy(strategy))) => {
                (Stage::ConfirmDeleteBranch { pr, strategy }, None)
            }

            // Delete branch?
            (
                Stage::ConfirmDeleteBranch { pr, strategy },
                Event::Input(answer @ (Input::Yes | Input::No)),
            ) => {
                let delete_branch = answer == Input::Yes;
                let effect = Effect::Merge {
                    number: pr.number,
                    strategy,
                    delete_branch,
                };
                self.status = Some("Merging PR...".to_string());
                (
                    Stage::Merging {
                        pr,
                        strategy,
                        delete_branch,
                    },
                    Some(effect),
                )
            }

            // Merging
            (
                Stage::Merging {
                    pr,
                    strategy,
                    delete_branch,
                },
                Event::Merged(Ok(())),
            ) => {
                let mut message = format!(
                    "Successfully merged PR #{} using {strategy} strategy",
                    pr.number
                );
                if delete_branch {
                    message.push_str(" and deleted branch");
                }
                (self.finish(OutcomeKind::Completed, message), None)
            }
            (Stage::Merging { pr, .. }, Event::Merged(Err(e))) => (
                self.finish(
                    OutcomeKind::Failed,
                    format!("Failed to merge PR #{}: {e}", pr.number),
                ),
                None,
            ),

            (stage, event) => {
                debug!(stage = stage.name(), ?event, "ignoring event");
                (stage, None)
            }
        }
    }

    fn finish(&mut self, kind: OutcomeKind, message: impl Into<String>) -> Stage {
        let message = message.into();
        self.status = Some(message.clone());
        Stage::Done(Outcome { kind, message })
    }
}
