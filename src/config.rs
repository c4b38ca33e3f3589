//! User configuration loaded from `~/.config/shippr/config.toml`.

use crate::error::{Error, Result};
use crate::workflow::Deadlines;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name under the platform config dir.
const CONFIG_DIR: &str = "shippr";

/// Filename for the config file.
const CONFIG_FILE: &str = "config.toml";

/// Body posted with "request changes" reviews when none is configured.
pub const DEFAULT_REVIEW_COMMENT: &str = "Changes requested via shippr";

/// Per-call deadlines, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Listing and viewing
    pub read_secs: u64,
    /// Approve / request changes
    pub review_secs: u64,
    /// Merging
    pub merge_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 15,
            review_secs: 30,
            merge_secs: 60,
        }
    }
}

/// shippr configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path or name of the GitHub CLI executable
    pub gh_path: String,
    /// Body for "request changes" reviews
    pub review_comment: String,
    /// Call deadlines
    pub timeouts: TimeoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gh_path: "gh".to_string(),
            review_comment: DEFAULT_REVIEW_COMMENT.to_string(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// used, and a missing file there yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Deadlines for the workflow driver and aggregator.
    pub const fn deadlines(&self) -> Deadlines {
        Deadlines {
            read: Duration::from_secs(self.timeouts.read_secs),
            review: Duration::from_secs(self.timeouts.review_secs),
            merge: Duration::from_secs(self.timeouts.merge_secs),
        }
    }
}

/// Get path to the default config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
