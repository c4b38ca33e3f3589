//! Colour theme

use owo_colors::{OwoColorize, Style};
use std::fmt::Display;

/// Styles used by the renderers
///
/// Passed explicitly to every render function.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Emit ANSI styling at all
    pub enabled: bool,
    /// Headings
    pub title: Style,
    /// Ordinary text
    pub info: Style,
    /// Success messages, additions
    pub success: Style,
    /// Errors, deletions, conflicts
    pub error: Style,
    /// Branch names and authors
    pub branch: Style,
    /// Secondary highlights
    pub accent: Style,
    /// `#123` PR numbers
    pub pr_number: Style,
    /// Key hints and state badges
    pub highlight: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let primary = (196, 113, 237);
        let secondary = (218, 112, 214);
        let accent = (221, 160, 221);
        let dark = (139, 0, 139);
        let light = (230, 230, 250);

        Self {
            enabled: true,
            title: Style::new().truecolor(primary.0, primary.1, primary.2).bold(),
            info: Style::new().truecolor(light.0, light.1, light.2),
            success: Style::new()
                .truecolor(secondary.0, secondary.1, secondary.2)
                .bold(),
            error: Style::new().truecolor(255, 20, 147).bold(),
            branch: Style::new().truecolor(accent.0, accent.1, accent.2),
            accent: Style::new().truecolor(accent.0, accent.1, accent.2),
            pr_number: Style::new().truecolor(primary.0, primary.1, primary.2).bold(),
            highlight: Style::new()
                .truecolor(dark.0, dark.1, dark.2)
                .on_truecolor(light.0, light.1, light.2)
                .bold(),
        }
    }
}

impl Theme {
    /// A theme that renders plain text
    pub fn plain() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Render `text` with `style`
    pub fn paint(&self, style: Style, text: impl Display) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Headings
    pub fn title(&self, text: impl Display) -> String {
        self.paint(self.title, text)
    }

    /// Ordinary text
    pub fn info(&self, text: impl Display) -> String {
        self.paint(self.info, text)
    }

    /// Success text
    pub fn success(&self, text: impl Display) -> String {
        self.paint(self.success, text)
    }

    /// Error text
    pub fn error(&self, text: impl Display) -> String {
        self.paint(self.error, text)
    }

    /// Branch names and authors
    pub fn branch(&self, text: impl Display) -> String {
        self.paint(self.branch, text)
    }

    /// Secondary highlight
    pub fn accent(&self, text: impl Display) -> String {
        self.paint(self.accent, text)
    }

    /// `#123`
    pub fn pr_number(&self, number: u64) -> String {
        self.paint(self.pr_number, format!("#{number}"))
    }

    /// Key hints and badges, padded by one space
    pub fn highlight(&self, text: impl Display) -> String {
        self.paint(self.highlight, format!(" {text} "))
    }
}
