//! CLI command implementations

mod interactive;
mod list;
mod style;

pub use interactive::{InteractiveOptions, run_interactive};
pub use list::run_list;
pub use style::error_prefix;
