//! Interactive merge workflow for a single repository

use crate::cli::style::start_spinner;
use anstream::println;
use async_trait::async_trait;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Select};
use indicatif::ProgressBar;
use shippr::config::Config;
use shippr::error::{Error, Result};
use shippr::provider::{GhCli, PrProvider, with_deadline};
use shippr::render::{Theme, pr_item, render, strategy_label};
use shippr::types::{MergeMethod, RepositoryRef};
use shippr::workflow::{Driver, Effect, Frontend, Input, Session, SessionOptions, Stage};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

/// Presentation flags from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractiveOptions {
    /// Draw in the terminal's alternate screen
    pub alt_screen: bool,
    /// Skip the details view
    pub quick: bool,
}

/// Run the interactive workflow against `repo`.
///
/// Returns whether the session ended without an error outcome.
pub async fn run_interactive(
    config: &Config,
    repo: RepositoryRef,
    options: InteractiveOptions,
) -> Result<bool> {
    let provider: Arc<dyn PrProvider> = Arc::new(GhCli::new(config.gh_path.clone()));
    let deadlines = config.deadlines();

    with_deadline(
        "checking for the GitHub CLI",
        deadlines.read,
        provider.check_available(),
    )
    .await?;

    let session_options = SessionOptions {
        inspect: !options.quick,
        review_comment: config.review_comment.clone(),
    };
    let (session, initial) = Session::start(repo.clone(), session_options);

    let driver = Driver::new(provider, repo, deadlines);
    let quit = driver.quit_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            quit.quit();
        }
    });

    let mut frontend = TerminalFrontend::new(Theme::default(), options.alt_screen)?;
    let result = driver.run(session, initial, &mut frontend).await;
    ctrl_c.abort();

    let session = result?;
    frontend.finish(&session);

    Ok(session.outcome().is_some_and(|outcome| !outcome.is_error()))
}

/// Terminal frontend: full-frame redraws, spinners and dialoguer prompts
struct TerminalFrontend {
    theme: Theme,
    alt_screen: bool,
    spinner: Option<ProgressBar>,
    busy_message: Option<String>,
    last_frame: Vec<String>,
}

impl TerminalFrontend {
    fn new(theme: Theme, alt_screen: bool) -> Result<Self> {
        if alt_screen {
            execute!(io::stdout(), EnterAlternateScreen)?;
        }
        Ok(Self {
            theme,
            alt_screen,
            spinner: None,
            busy_message: None,
            last_frame: Vec::new(),
        })
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn leave_alt_screen(&mut self) {
        if self.alt_screen {
            self.alt_screen = false;
            if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
                debug!(error = %e, "failed to leave alternate screen");
            }
        }
    }

    /// Restore the normal screen and leave the outcome visible on it.
    fn finish(mut self, session: &Session) {
        self.clear_spinner();
        if self.alt_screen {
            self.leave_alt_screen();
            for line in render(session, &self.theme) {
                println!("{line}");
            }
        }
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        self.clear_spinner();
        self.leave_alt_screen();
    }
}

#[async_trait]
impl Frontend for TerminalFrontend {
    fn render(&mut self, session: &Session) {
        self.clear_spinner();

        let frame: Vec<String> = render(session, &self.theme).collect();
        if frame != self.last_frame {
            if self.alt_screen {
                if let Err(e) = execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0)) {
                    debug!(error = %e, "failed to clear screen");
                }
            } else if !self.last_frame.is_empty() {
                println!();
            }
            for line in &frame {
                println!("{line}");
            }
            let _ = io::stdout().flush();
            self.last_frame = frame;
        }

        if session.is_busy() {
            let message = self
                .busy_message
                .clone()
                .or_else(|| session.status().map(str::to_string))
                .unwrap_or_default();
            self.spinner = Some(start_spinner(message));
        }
    }

    fn call_started(&mut self, effect: &Effect) {
        self.busy_message = Some(effect.description());
    }

    fn call_finished(&mut self) {
        self.busy_message = None;
        self.clear_spinner();
    }

    async fn next_input(&mut self, session: &Session) -> Result<Input> {
        let Some(prompt) = Prompt::for_session(session) else {
            // Nothing to ask; the driver is waiting on a call or a quit
            return std::future::pending().await;
        };

        tokio::task::spawn_blocking(move || prompt.ask())
            .await
            .map_err(|e| Error::Internal(format!("prompt task failed: {e}")))?
    }
}

/// Detail-view actions, in menu order
const DETAIL_ACTIONS: [(&str, Input); 5] = [
    ("Approve", Input::Approve),
    ("Request changes", Input::RequestChanges),
    ("Merge", Input::Proceed),
    ("Back to list", Input::Back),
    ("Quit", Input::Quit),
];

/// The question the current stage asks
#[derive(Debug, Clone, PartialEq, Eq)]
enum Prompt {
    PickPr(Vec<String>),
    Details,
    Confirm(&'static str),
    Strategy,
}

impl Prompt {
    fn for_session(session: &Session) -> Option<Self> {
        match session.stage() {
            Stage::Selecting { loading: None } => Some(Self::PickPr(
                session.prs().iter().map(pr_item).collect(),
            )),
            Stage::ViewingDetails {
                submitting: None, ..
            } => Some(Self::Details),
            Stage::ConfirmOpenInBrowser { opening: false, .. } => {
                Some(Self::Confirm("Open PR in browser before merging?"))
            }
            Stage::PickingStrategy { .. } => Some(Self::Strategy),
            Stage::ConfirmDeleteBranch { .. } => Some(Self::Confirm("Delete branch after merging?")),
            _ => None,
        }
    }

    /// Blocking: reads from the terminal.
    fn ask(self) -> Result<Input> {
        let theme = ColorfulTheme::default();
        let answer = match self {
            Self::PickPr(items) => FuzzySelect::with_theme(&theme)
                .with_prompt("Select a pull request (Esc to quit)")
                .items(&items)
                .default(0)
                .interact_opt()
                .map(|choice| choice.map(Input::Choose)),
            Self::Details => {
                let labels: Vec<&str> = DETAIL_ACTIONS.iter().map(|(label, _)| *label).collect();
                Select::with_theme(&theme)
                    .with_prompt("Action")
                    .items(&labels)
                    .default(0)
                    .interact_opt()
                    .map(|choice| choice.map(|i| DETAIL_ACTIONS[i].1))
            }
            Self::Confirm(question) => Confirm::with_theme(&theme)
                .with_prompt(question)
                .default(false)
                .interact_opt()
                .map(|answer| answer.map(|yes| if yes { Input::Yes } else { Input::No })),
            Self::Strategy => {
                let labels: Vec<&str> = MergeMethod::ALL.iter().map(|m| strategy_label(*m)).collect();
                Select::with_theme(&theme)
                    .with_prompt("Merge strategy")
                    .items(&labels)
                    .default(0)
                    .interact_opt()
                    .map(|choice| choice.map(|i| Input::Strategy(MergeMethod::ALL[i])))
            }
        };

        match answer {
            Ok(Some(input)) => Ok(input),
            // Esc / q
            Ok(None) => Ok(Input::Quit),
            Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => {
                Ok(Input::Quit)
            }
            Err(dialoguer::Error::IO(e)) => Err(Error::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shippr::types::{Mergeable, PrState, PullRequest};
    use shippr::workflow::Event;

    fn pr(number: u64) -> PullRequest {
        PullRequest {
            number,
            title: format!("PR {number}"),
            head_ref: format!("feature-{number}"),
            author: "octocat".to_string(),
            state: PrState::Open,
            mergeable: Mergeable::Mergeable,
            labels: vec![],
            url: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn quick_session() -> Session {
        let options = SessionOptions {
            inspect: false,
            ..SessionOptions::default()
        };
        let (mut session, _) = Session::start(RepositoryRef::new("acme", "api"), options);
        session.update(Event::PrsFetched(Ok(vec![pr(1), pr(2)])));
        session
    }

    #[test]
    fn test_no_prompt_while_fetching() {
        let (session, _) = Session::start(RepositoryRef::new("acme", "api"), SessionOptions::default());
        assert_eq!(Prompt::for_session(&session), None);
    }

    #[test]
    fn test_prompts_follow_stages() {
        let mut session = quick_session();

        match Prompt::for_session(&session) {
            Some(Prompt::PickPr(items)) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0], "#1 PR 1  (feature-1)");
                // Filtered by the picker, so no escape codes
                assert!(items.iter().all(|item| !item.contains('\u{1b}')));
            }
            other => panic!("expected PR picker, got {other:?}"),
        }

        session.update(Event::Input(Input::Choose(1)));
        assert_eq!(
            Prompt::for_session(&session),
            Some(Prompt::Confirm("Open PR in browser before merging?"))
        );

        session.update(Event::Input(Input::No));
        assert_eq!(Prompt::for_session(&session), Some(Prompt::Strategy));

        session.update(Event::Input(Input::Strategy(MergeMethod::Squash)));
        assert_eq!(
            Prompt::for_session(&session),
            Some(Prompt::Confirm("Delete branch after merging?"))
        );

        session.update(Event::Input(Input::Yes));
        assert_eq!(Prompt::for_session(&session), None);
    }

    #[test]
    fn test_detail_actions_cover_navigation() {
        let inputs: Vec<Input> = DETAIL_ACTIONS.iter().map(|(_, input)| *input).collect();
        assert!(inputs.contains(&Input::Proceed));
        assert!(inputs.contains(&Input::Back));
        assert!(inputs.contains(&Input::Quit));
    }
}
