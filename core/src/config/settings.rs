//! Process-wide settings
//!
//! Core only accepts loaded settings. Discovery and flag overrides live in the
//! CLI layer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: i64 = 300;

/// Global settings, usually read from `settings.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the generate API, e.g. `http://localhost:11434/api`
    pub api_base_url: String,

    /// Directory that step folder names are resolved against
    #[serde(default)]
    pub folder_base_path: PathBuf,

    /// Per-request timeout in seconds; zero or negative means unbounded
    #[serde(default = "default_timeout")]
    pub timeout: i64,
}

fn default_timeout() -> i64 {
    DEFAULT_TIMEOUT_SECS
}

impl Settings {
    /// Create settings with the default timeout
    pub fn new(api_base_url: impl Into<String>, folder_base_path: impl Into<PathBuf>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            folder_base_path: folder_base_path.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the per-request timeout in seconds
    pub fn with_timeout(mut self, timeout: i64) -> Self {
        self.timeout = timeout;
        self
    }

    /// The per-request bound, or `None` when no explicit bound applies
    pub fn timeout_duration(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout as u64))
    }

    /// Absolute-or-relative path of a step folder
    pub fn folder_path(&self, folder: &str) -> PathBuf {
        self.folder_base_path.join(folder)
    }

    /// The base directory step folders live under
    pub fn folder_base(&self) -> &Path {
        &self.folder_base_path
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.api_base_url.is_empty() {
            return Err("API base URL cannot be empty".to_string());
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err("API base URL must start with http:// or https://".to_string());
        }

        Ok(())
    }
}
