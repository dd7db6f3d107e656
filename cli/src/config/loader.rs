//! Settings loader for goll
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --settings file/dir (highest priority)
//! 2. Current working directory: ./settings.json
//! 3. XDG config: $XDG_CONFIG_HOME/goll/settings.json or ~/.config/goll/settings.json
//! 4. Flags / environment only (requires an API base URL)

use anyhow::{anyhow, Context, Result};
use goll_core::config::DEFAULT_TIMEOUT_SECS;
use goll_core::Settings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SETTINGS_FILE: &str = "settings.json";

/// Raw settings file format; every field may be filled in by a flag instead
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSettings {
    pub api_base_url: Option<String>,
    pub folder_base_path: Option<PathBuf>,
    pub timeout: Option<i64>,
}

/// Settings loader
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    /// Override settings file/directory path
    settings_override: Option<PathBuf>,
    /// Flag overrides
    api_base_override: Option<String>,
    folder_base_override: Option<PathBuf>,
    timeout_override: Option<i64>,
}

impl SettingsLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set settings file/directory override
    pub fn with_settings_override(mut self, path: PathBuf) -> Self {
        self.settings_override = Some(path);
        self
    }

    /// Set API base URL override
    pub fn with_api_base_override(mut self, api_base: String) -> Self {
        self.api_base_override = Some(api_base);
        self
    }

    /// Set folder base override
    pub fn with_folder_base_override(mut self, folder_base: PathBuf) -> Self {
        self.folder_base_override = Some(folder_base);
        self
    }

    /// Set timeout override (seconds)
    pub fn with_timeout_override(mut self, timeout: i64) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    /// Load and resolve settings
    pub async fn load(&self) -> Result<Settings> {
        // Step 1: Find and load the base file
        let mut raw = if let Some(override_path) = &self.settings_override {
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load settings from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_and_load().await?
        };

        // Step 2: Apply flag overrides
        if let Some(api_base) = &self.api_base_override {
            raw.api_base_url = Some(api_base.clone());
        }
        if let Some(folder_base) = &self.folder_base_override {
            raw.folder_base_path = Some(folder_base.clone());
        }
        if let Some(timeout) = self.timeout_override {
            raw.timeout = Some(timeout);
        }

        // Step 3: Resolve
        Self::resolve(raw)
    }

    /// Search for settings in priority order
    async fn search_and_load(&self) -> Result<RawSettings> {
        let cwd_settings = std::env::current_dir()?.join(SETTINGS_FILE);
        if cwd_settings.exists() {
            return self.load_file(&cwd_settings).await;
        }

        if let Some(config_dir) = Self::xdg_config_dir() {
            let path = config_dir.join("goll").join(SETTINGS_FILE);
            if path.exists() {
                return self.load_file(&path).await;
            }
        }

        if self.api_base_override.is_some() {
            debug!("No settings file found, using flags only");
            return Ok(RawSettings::default());
        }

        Err(anyhow!(
            "No settings found. Create ./{} or pass --settings / --api-base",
            SETTINGS_FILE
        ))
    }

    /// Load settings from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawSettings> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let settings_file = path.join(SETTINGS_FILE);
            if settings_file.exists() {
                self.load_file(&settings_file).await
            } else {
                Err(anyhow!(
                    "No {} found in directory: {}",
                    SETTINGS_FILE,
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Settings path does not exist: {}", path.display()))
        }
    }

    /// Load a single settings file
    async fn load_file(&self, path: &Path) -> Result<RawSettings> {
        debug!("Loading settings from {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Get XDG config directory
    fn xdg_config_dir() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
    }

    /// Resolve raw settings to validated core settings
    fn resolve(raw: RawSettings) -> Result<Settings> {
        let api_base_url = raw
            .api_base_url
            .ok_or_else(|| anyhow!("api_base_url is required"))?;
        let settings = Settings::new(
            api_base_url,
            raw.folder_base_path.unwrap_or_else(|| PathBuf::from(".")),
        )
        .with_timeout(raw.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));

        settings
            .validate()
            .map_err(|e| anyhow!("Settings validation failed: {}", e))?;

        Ok(settings)
    }
}
