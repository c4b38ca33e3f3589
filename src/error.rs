//! Error types for shippr

use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the provider gateway, the workflow and the CLI
#[derive(Debug, Error)]
pub enum Error {
    /// The provider executable could not be run at all
    #[error("'{binary}' not found, please install GitHub CLI: {reason}")]
    ProviderUnavailable {
        /// Executable that was probed
        binary: String,
        /// Why the probe failed
        reason: String,
    },

    /// A provider call exited unsuccessfully
    #[error("{command} failed\n{diagnostic}")]
    CallFailed {
        /// Short name of the failed command (e.g. `gh pr list`)
        command: String,
        /// Combined stdout/stderr captured from the process
        diagnostic: String,
    },

    /// Provider output was not the JSON we asked for
    #[error("failed to parse {command} output: {source}")]
    Parse {
        /// Short name of the command whose output was rejected
        command: String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// A provider call did not finish before its deadline
    #[error("{operation} timed out after {}s", after.as_secs())]
    Timeout {
        /// Operation that was abandoned
        operation: String,
        /// The deadline that expired
        after: Duration,
    },

    /// Repository slug is not `owner/name`
    #[error("invalid repository '{0}': expected owner/name")]
    InvalidRepository(String),

    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else (prompt failures, closed channels)
    #[error("internal error: {0}")]
    Internal(String),
}
