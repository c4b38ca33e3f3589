//! Aggregation table for `shippr list`

use super::{Theme, pad_right, truncate};
use crate::types::{AggregationRow, PullRequest};

const MIN_REPO_WIDTH: usize = 16;
const NUMBER_WIDTH: usize = 6;
const MIN_AUTHOR_WIDTH: usize = 12;
const BRANCH_WIDTH: usize = 24;
const MIN_LABELS_WIDTH: usize = 15;
const STATUS_WIDTH: usize = 10;
const MIN_TITLE_WIDTH: usize = 25;

/// Two spaces between each of the seven columns
const GUTTERS: usize = 12;

/// Layout options for [`render_table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Terminal width in columns
    pub width: usize,
    /// Wrap PR numbers in OSC 8 hyperlinks
    pub hyperlinks: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            width: 120,
            hyperlinks: false,
        }
    }
}

/// `CONFLICT` for open PRs that conflict, otherwise the state
pub fn status_label(pr: &PullRequest) -> String {
    if pr.is_conflicting() {
        "CONFLICT".to_string()
    } else {
        pr.state.to_string()
    }
}

fn labels_text(pr: &PullRequest) -> String {
    if pr.labels.is_empty() {
        "-".to_string()
    } else {
        pr.labels.join(", ")
    }
}

fn widest<'a>(values: impl Iterator<Item = &'a str>, floor: usize) -> usize {
    values.map(|v| v.chars().count()).max().unwrap_or(0).max(floor)
}

/// Render rows as header, rule and one line per PR.
///
/// Rows are sorted by repository then PR number.
pub fn render_table(rows: &[AggregationRow], options: TableOptions, theme: &Theme) -> Vec<String> {
    let mut rows: Vec<&AggregationRow> = rows.iter().collect();
    rows.sort_by(|a, b| a.repo.cmp(&b.repo).then(a.pr.number.cmp(&b.pr.number)));

    let slugs: Vec<String> = rows.iter().map(|r| r.repo.slug()).collect();
    let labels: Vec<String> = rows.iter().map(|r| labels_text(&r.pr)).collect();

    let repo_w = widest(slugs.iter().map(String::as_str), MIN_REPO_WIDTH);
    let author_w = widest(rows.iter().map(|r| r.pr.author.as_str()), MIN_AUTHOR_WIDTH);
    let labels_w = widest(labels.iter().map(String::as_str), MIN_LABELS_WIDTH);
    let fixed = repo_w + NUMBER_WIDTH + author_w + BRANCH_WIDTH + labels_w + STATUS_WIDTH + GUTTERS;
    let title_w = options.width.saturating_sub(fixed).max(MIN_TITLE_WIDTH);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(
        [
            pad_right("REPO", repo_w),
            pad_right("PR", NUMBER_WIDTH),
            pad_right("AUTHOR", author_w),
            pad_right("TITLE", title_w),
            pad_right("BRANCH", BRANCH_WIDTH),
            pad_right("LABELS", labels_w),
            pad_right("STATUS", STATUS_WIDTH),
        ]
        .iter()
        .map(|h| theme.title(h))
        .collect::<Vec<_>>()
        .join("  "),
    );
    lines.push(theme.info("─".repeat(fixed + title_w)));

    for ((row, slug), labels) in rows.iter().zip(&slugs).zip(&labels) {
        let pr = &row.pr;
        let number = pad_right(&format!("#{}", pr.number), NUMBER_WIDTH);
        let number = match (&pr.url, options.hyperlinks) {
            (Some(url), true) => terminal_link::Link::new(&number, url).to_string(),
            _ => number,
        };

        let status = status_label(pr);
        let status_cell = pad_right(&status, STATUS_WIDTH);
        let status_cell = match status.as_str() {
            "OPEN" => theme.success(status_cell),
            "CONFLICT" => theme.error(status_cell),
            _ => theme.info(status_cell),
        };

        lines.push(
            [
                theme.info(pad_right(slug, repo_w)),
                theme.paint(theme.pr_number, number),
                theme.branch(pad_right(&pr.author, author_w)),
                pad_right(&truncate(&pr.title, title_w), title_w),
                theme.branch(pad_right(&truncate(&pr.head_ref, BRANCH_WIDTH), BRANCH_WIDTH)),
                pad_right(labels, labels_w),
                status_cell,
            ]
            .join("  "),
        );
    }

    lines
}
