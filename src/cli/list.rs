//! List command - open PRs across an organization

use crate::cli::style::start_spinner;
use anstream::println;
use shippr::aggregate::{list_open_prs_for_org, repositories_with_rows};
use shippr::config::Config;
use shippr::error::Result;
use shippr::provider::{GhCli, PrProvider};
use shippr::render::{TableOptions, Theme, render_table};
use std::sync::Arc;
use supports_hyperlinks::Stream;

/// Width used when neither the terminal nor `$COLUMNS` reports one
const FALLBACK_WIDTH: usize = 120;

/// Run the list command
pub async fn run_list(config: &Config, org: &str, limit: Option<usize>) -> Result<()> {
    let provider: Arc<dyn PrProvider> = Arc::new(GhCli::new(config.gh_path.clone()));
    let theme = Theme::default();

    let spinner = start_spinner(format!("Listing open pull requests for {org}..."));
    let rows = list_open_prs_for_org(provider, org, limit, config.deadlines().read).await;
    spinner.finish_and_clear();
    let rows = rows?;

    if rows.is_empty() {
        println!(
            "{}",
            theme.info(format!("No open PRs for {}", theme.title(org)))
        );
        return Ok(());
    }

    let options = TableOptions {
        width: terminal_width(),
        hyperlinks: supports_hyperlinks::on(Stream::Stdout),
    };
    for line in render_table(&rows, options, &theme) {
        println!("{line}");
    }

    println!();
    println!(
        "{}",
        theme.info(format!(
            "{} open PR(s) across {} repositories",
            rows.len(),
            repositories_with_rows(&rows).len()
        ))
    );

    Ok(())
}

/// Terminal width, then `$COLUMNS`, then 120.
fn terminal_width() -> usize {
    crossterm::terminal::size()
        .ok()
        .map(|(w, _)| usize::from(w))
        .filter(|w| *w > 0)
        .or_else(|| {
            std::env::var("COLUMNS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|w| *w > 0)
        })
        .unwrap_or(FALLBACK_WIDTH)
}
