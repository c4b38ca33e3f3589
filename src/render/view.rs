//! Session view: one screen per workflow stage

use super::{Theme, truncate};
use crate::types::{ChangeKind, MergeMethod, PullRequest, PullRequestDetails, ReviewState};
use crate::workflow::{OutcomeKind, Session, Stage};
use std::iter;

/// Longest description excerpt shown in the details view
const BODY_PREVIEW_CHARS: usize = 200;

/// Files listed before collapsing into "... and N more"
const FILE_PREVIEW_COUNT: usize = 5;

const LOGO: [&str; 4] = [
    r"     _     _                   ",
    r" ___| |__ (_)_ __  _ __  _ __  ",
    r"/ __| '_ \| | '_ \| '_ \| '__| ",
    r"\__ \ | | | | |_) | |_) | |    ",
];

const LOGO_TAIL: [&str; 2] = [r"|___/_| |_|_| .__/| .__/|_|    ", r"             |_|   |_|         "];

type Lines<'a> = Box<dyn Iterator<Item = String> + 'a>;

/// Render the session as display lines, lazily.
///
/// Lists that the operator picks from (PRs, strategies) are drawn by the
/// prompt; this renders the context around them.
pub fn render<'a>(session: &'a Session, theme: &'a Theme) -> Lines<'a> {
    match session.stage() {
        Stage::Fetching => Box::new(
            LOGO.iter()
                .chain(LOGO_TAIL.iter())
                .map(move |line| theme.title(line))
                .chain(iter::once(String::new()))
                .chain(iter::once(theme.info(format!(
                    "Fetching pull requests for {}...",
                    session.repo()
                )))),
        ),
        Stage::Selecting { loading: None } => Box::new(
            [
                theme.title(format!("Open Pull Requests · {}", session.repo())),
                theme.info(format!("{} open", session.prs().len())),
            ]
            .into_iter(),
        ),
        Stage::Selecting { loading: Some(pr) } => Box::new(iter::once(format!(
            "{} {}",
            theme.info("Loading PR details for"),
            theme.pr_number(pr.number)
        ))),
        Stage::ViewingDetails {
            details,
            submitting,
            ..
        } => {
            let footer = match submitting {
                Some(_) => iter::once(theme.info(session.status().unwrap_or_default())),
                None => iter::once(action_hints(theme)),
            };
            Box::new(render_details(details, theme).chain(footer))
        }
        Stage::ConfirmOpenInBrowser { pr, opening } => {
            let status = session
                .status()
                .filter(|_| !opening)
                .map(|s| theme.success(s));
            Box::new(
                status
                    .into_iter()
                    .chain([
                        theme.title("PR Preview"),
                        format!("PR {}: {}", theme.pr_number(pr.number), pr.title),
                        String::new(),
                        format!("Branch: {}", theme.branch(&pr.head_ref)),
                    ])
                    .chain(opening.then(|| theme.info("Opening PR in browser..."))),
            )
        }
        Stage::PickingStrategy { pr } => Box::new(
            [
                theme.title("Choose merge strategy"),
                format!("PR {}: {}", theme.pr_number(pr.number), pr.title),
            ]
            .into_iter(),
        ),
        Stage::ConfirmDeleteBranch { pr, strategy } => Box::new(
            [
                theme.title("Merge Confirmation"),
                format!(
                    "Ready to merge PR {} with {} strategy",
                    theme.pr_number(pr.number),
                    theme.info(strategy.to_string().to_uppercase())
                ),
                String::new(),
                format!("Branch: {}", theme.branch(&pr.head_ref)),
            ]
            .into_iter(),
        ),
        Stage::Merging { pr, strategy, .. } => Box::new(iter::once(theme.info(format!(
            "Merging PR #{} ({strategy})...",
            pr.number
        )))),
        Stage::Done(outcome) => {
            let (heading, message) = match outcome.kind {
                OutcomeKind::Failed => (theme.error("❌ Error"), theme.error(&outcome.message)),
                OutcomeKind::Completed => {
                    (theme.success("✅ Success"), theme.success(&outcome.message))
                }
                OutcomeKind::Empty | OutcomeKind::Quit => {
                    (theme.title("Nothing to do"), theme.info(&outcome.message))
                }
            };
            Box::new([heading, message].into_iter())
        }
    }
}

fn render_details<'a>(details: &'a PullRequestDetails, theme: &'a Theme) -> Lines<'a> {
    let pr = &details.pr;

    let header = [
        theme.title(format!("PR #{}: {}", pr.number, pr.title)),
        theme.info(format!(
            "by {} • {} → {}",
            pr.author, pr.head_ref, details.base_ref
        )),
        String::new(),
        format!(
            "{}  {}  {}",
            theme.highlight(pr.state),
            theme.success(format!("+{}", details.additions)),
            theme.error(format!("-{}", details.deletions)),
        ),
        String::new(),
    ];

    let description = (!details.body.trim().is_empty())
        .then(move || {
            [
                theme.title("Description:"),
                theme.info(truncate(details.body.trim(), BODY_PREVIEW_CHARS)),
                String::new(),
            ]
        })
        .into_iter()
        .flatten();

    let hidden_files = details.files.len().saturating_sub(FILE_PREVIEW_COUNT);
    let files = iter::once(theme.title(format!("Files Changed ({}):", details.changed_files)))
        .chain(
            details
                .files
                .iter()
                .take(FILE_PREVIEW_COUNT)
                .map(move |file| {
                    let icon = match file.kind {
                        ChangeKind::Added => theme.success("A"),
                        ChangeKind::Modified => theme.accent("M"),
                        ChangeKind::Removed => theme.error("D"),
                        ChangeKind::Renamed => theme.accent("R"),
                        ChangeKind::Unknown => theme.info("?"),
                    };
                    format!(
                        "  {icon} {} {}",
                        file.path,
                        theme.info(format!("(+{} -{})", file.additions, file.deletions))
                    )
                }),
        )
        .chain((hidden_files > 0).then(move || theme.info(format!("... and {hidden_files} more files"))))
        .chain(iter::once(String::new()));

    let reviews = (!details.reviews.is_empty())
        .then(move || {
            iter::once(theme.title("Reviews:"))
                .chain(details.reviews.iter().map(move |review| {
                    let icon = match review.state {
                        ReviewState::Approved => theme.success("✓"),
                        ReviewState::ChangesRequested => theme.error("✗"),
                        ReviewState::Commented => theme.info("💬"),
                        _ => theme.info("?"),
                    };
                    format!("  {icon} {}", review.author)
                }))
                .chain(iter::once(String::new()))
        })
        .into_iter()
        .flatten();

    let requested = (!details.review_requests.is_empty())
        .then(move || {
            [
                format!(
                    "{} {}",
                    theme.title("Review requested from:"),
                    theme.branch(details.review_requests.join(", "))
                ),
                String::new(),
            ]
        })
        .into_iter()
        .flatten();

    let checks = (!details.status_checks.is_empty())
        .then(move || {
            iter::once(theme.title("Checks:"))
                .chain(details.status_checks.iter().map(move |check| {
                    let state = match check.state.to_ascii_uppercase().as_str() {
                        "SUCCESS" | "NEUTRAL" | "SKIPPED" => theme.success(&check.state),
                        "FAILURE" | "ERROR" | "CANCELLED" | "TIMED_OUT" | "ACTION_REQUIRED" => {
                            theme.error(&check.state)
                        }
                        _ => theme.info(&check.state),
                    };
                    format!("  {state} {}", check.name)
                }))
                .chain(iter::once(String::new()))
        })
        .into_iter()
        .flatten();

    Box::new(
        header
            .into_iter()
            .chain(description)
            .chain(files)
            .chain(reviews)
            .chain(requested)
            .chain(checks),
    )
}

fn action_hints(theme: &Theme) -> String {
    format!(
        "{} Approve  {} Request Changes  {} Merge  {} Back  {} Quit",
        theme.highlight("a"),
        theme.highlight("r"),
        theme.highlight("m"),
        theme.highlight("b"),
        theme.highlight("q"),
    )
}

/// One entry in the PR picker.
///
/// Unstyled: the picker fuzzy-matches on the raw text and applies its own
/// highlighting.
pub fn pr_item(pr: &PullRequest) -> String {
    format!("#{} {}  ({})", pr.number, pr.title, pr.head_ref)
}

/// One entry in the strategy picker
pub fn strategy_label(method: MergeMethod) -> &'static str {
    match method {
        MergeMethod::Squash => "Squash (default)",
        MergeMethod::Rebase => "Rebase",
        MergeMethod::Merge => "Merge",
    }
}
