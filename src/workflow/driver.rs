//! Workflow driver - effectful event loop
//!
//! Renders the session, reads operator input, and runs the provider call
//! requested by each transition on a spawned task. Inputs and call
//! completions arrive on one channel, so exactly one transition is applied
//! at a time.

use crate::error::{Error, Result};
use crate::provider::{PrProvider, with_deadline};
use crate::types::RepositoryRef;
use crate::workflow::session::{Effect, Event, Input, Session};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

/// Per-call deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    /// Listing, viewing and opening in the browser
    pub read: Duration,
    /// Approve / request changes
    pub review: Duration,
    /// Merging
    pub merge: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(15),
            review: Duration::from_secs(30),
            merge: Duration::from_secs(60),
        }
    }
}

impl Deadlines {
    const fn for_effect(&self, effect: &Effect) -> Duration {
        match effect {
            Effect::FetchPrs | Effect::FetchDetails { .. } | Effect::OpenInBrowser { .. } => {
                self.read
            }
            Effect::Approve { .. } | Effect::RequestChanges { .. } => self.review,
            Effect::Merge { .. } => self.merge,
        }
    }
}

/// Terminal side of the workflow
///
/// The CLI implements this with prompts and spinners; tests script it.
#[async_trait]
pub trait Frontend: Send {
    /// Show the current state
    fn render(&mut self, session: &Session);

    /// A provider call was dispatched
    fn call_started(&mut self, _effect: &Effect) {}

    /// The outstanding provider call completed
    fn call_finished(&mut self) {}

    /// Wait for the operator's next input in the current stage
    async fn next_input(&mut self, session: &Session) -> Result<Input>;
}

/// Injects `Quit` into a running driver (e.g. from a Ctrl-C handler)
#[derive(Debug, Clone)]
pub struct QuitHandle {
    tx: UnboundedSender<Event>,
}

impl QuitHandle {
    /// Ask the session to end
    pub fn quit(&self) {
        // Receiver gone means the session already ended
        let _ = self.tx.send(Event::Input(Input::Quit));
    }
}

/// Runs one session against a provider
pub struct Driver {
    provider: Arc<dyn PrProvider>,
    repo: RepositoryRef,
    deadlines: Deadlines,
    tx: UnboundedSender<Event>,
    rx: UnboundedReceiver<Event>,
}

impl Driver {
    /// Create a driver for `repo`
    pub fn new(provider: Arc<dyn PrProvider>, repo: RepositoryRef, deadlines: Deadlines) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            provider,
            repo,
            deadlines,
            tx,
            rx,
        }
    }

    /// Handle for ending the session from outside the loop
    pub fn quit_handle(&self) -> QuitHandle {
        QuitHandle {
            tx: self.tx.clone(),
        }
    }

    /// Drive `session` to [`Stage::Done`](crate::workflow::Stage::Done).
    ///
    /// `initial` is the effect returned by [`Session::start`].
    pub async fn run<F: Frontend>(
        mut self,
        mut session: Session,
        initial: Effect,
        frontend: &mut F,
    ) -> Result<Session> {
        frontend.call_started(&initial);
        self.dispatch(initial);

        loop {
            frontend.render(&session);
            if session.is_done() {
                return Ok(session);
            }

            let event = if session.is_busy() {
                self.rx.recv().await
            } else {
                tokio::select! {
                    input = frontend.next_input(&session) => Some(Event::Input(input?)),
                    event = self.rx.recv() => event,
                }
            };
            let event =
                event.ok_or_else(|| Error::Internal("workflow event channel closed".to_string()))?;

            if event.is_completion() {
                frontend.call_finished();
            }

            if let Some(effect) = session.update(event) {
                frontend.call_started(&effect);
                self.dispatch(effect);
            }
        }
    }

    fn dispatch(&self, effect: Effect) {
        let provider = Arc::clone(&self.provider);
        let repo = self.repo.clone();
        let deadline = self.deadlines.for_effect(&effect);
        let tx = self.tx.clone();

        debug!(?effect, ?deadline, "dispatching provider call");
        tokio::spawn(async move {
            let event = perform(provider.as_ref(), &repo, effect, deadline).await;
            // Receiver gone means the operator quit while the call was in flight
            let _ = tx.send(event);
        });
    }
}

/// Perform one effect and turn its result into the completion event.
async fn perform(
    provider: &dyn PrProvider,
    repo: &RepositoryRef,
    effect: Effect,
    deadline: Duration,
) -> Event {
    match effect {
        Effect::FetchPrs => Event::PrsFetched(
            with_deadline("listing pull requests", deadline, provider.list_open_prs(repo)).await,
        ),
        Effect::FetchDetails { number } => Event::DetailsFetched(
            with_deadline(
                "fetching PR details",
                deadline,
                provider.get_pr_details(repo, number),
            )
            .await,
        ),
        Effect::Approve { number } => Event::Reviewed(
            with_deadline("approving PR", deadline, provider.approve_pr(repo, number)).await,
        ),
        Effect::RequestChanges { number, comment } => Event::Reviewed(
            with_deadline(
                "requesting changes",
                deadline,
                provider.request_changes(repo, number, &comment),
            )
            .await,
        ),
        Effect::OpenInBrowser { number } => {
            if let Err(e) =
                with_deadline("opening browser", deadline, provider.open_in_browser(repo, number))
                    .await
            {
                debug!(number, error = %e, "ignoring browser failure");
            }
            Event::BrowserClosed
        }
        Effect::Merge {
            number,
            strategy,
            delete_branch,
        } => Event::Merged(
            with_deadline(
                "merging PR",
                deadline,
                provider.merge_pr(repo, number, strategy, delete_branch),
            )
            .await,
        ),
    }
}
