//! Text rendering
//!
//! Pure functions from state to display lines. Colours come from an
//! explicit [`Theme`]; nothing here touches the terminal.

mod table;
mod theme;
mod view;

pub use table::{TableOptions, render_table, status_label};
pub use theme::Theme;
pub use view::{pr_item, render, strategy_label};

/// Truncate to `width` characters, ending in `…` when shortened.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width <= 1 {
        return s.chars().take(width).collect();
    }
    let mut out: String = s.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// Pad with spaces to at least `width` characters.
pub fn pad_right(s: &str, width: usize) -> String {
    format!("{s:<width$}")
}
