//! Terminal styling helpers shared by the commands

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Spinner tick interval
const SPINNER_TICK: Duration = Duration::from_millis(80);

/// Style for the "call in flight" spinner
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.magenta} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}

/// Start a steady spinner with `message`
pub fn start_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(message.into());
    spinner.enable_steady_tick(SPINNER_TICK);
    spinner
}

/// `error:` prefix for fatal messages
pub fn error_prefix() -> String {
    "error:".red().bold().to_string()
}
