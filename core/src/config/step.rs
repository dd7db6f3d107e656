//! Per-folder step configuration
//!
//! A step folder holds `config.json` (model and options), `system.txt`,
//! an optional `format.json`, and usually `prompt.txt`. The prompt is read
//! separately by the pipeline since it may come from elsewhere.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::types::{ModelOptions, OutputFormat};

pub const CONFIG_FILE: &str = "config.json";
pub const SYSTEM_FILE: &str = "system.txt";
pub const PROMPT_FILE: &str = "prompt.txt";
pub const FORMAT_FILE: &str = "format.json";

/// Resolved configuration of one step folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Model identifier
    pub model: String,

    /// Sampling options, defaults already merged under folder values
    pub options: ModelOptions,

    /// System prompt text
    pub system: String,

    /// Structured-output schema, absent for free text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

/// On-disk shape of `config.json`
#[derive(Debug, Deserialize)]
struct RawStepConfig {
    #[serde(default)]
    model: String,
    #[serde(default)]
    options: ModelOptions,
    #[serde(default)]
    format: Option<OutputFormat>,
}

impl StepConfig {
    /// Load a step configuration from a folder
    pub async fn load(folder: &Path) -> Result<Self> {
        let config_path = folder.join(CONFIG_FILE);
        let content = read_artifact(&config_path).await?;
        let raw: RawStepConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: config_path.display().to_string(),
                source,
            })?;

        if raw.model.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: format!("{}.model", config_path.display()),
            }
            .into());
        }

        let system = read_artifact(&folder.join(SYSTEM_FILE)).await?;

        let format = match raw.format.filter(|f| !f.is_empty()) {
            Some(format) => Some(format),
            None => load_format_file(&folder.join(FORMAT_FILE)).await?,
        };

        debug!(
            "Loaded step config from {} (model: {}, format: {})",
            folder.display(),
            raw.model,
            format.is_some()
        );

        Ok(Self {
            model: raw.model,
            options: raw.options,
            system,
            format,
        })
    }
}

/// `format.json` is optional; only a present-but-malformed file is an error
async fn load_format_file(path: &Path) -> Result<Option<OutputFormat>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            }
            .into())
        }
    };

    let format: OutputFormat =
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    Ok(Some(format).filter(|f| !f.is_empty()))
}

/// Read a required text artifact
pub(crate) async fn read_artifact(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|source| {
        let path = path.display().to_string();
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound { path }.into()
        } else {
            ConfigError::Read { path, source }.into()
        }
    })
}
