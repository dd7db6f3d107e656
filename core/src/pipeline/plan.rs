//! Which folders run, in what order, and how prompts flow between them

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the steps of a run relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    /// Explicit folder list; each output becomes the next folder's prompt
    Chained,
    /// Every immediate subfolder of one parent, run independently
    Recursive,
}

/// Ordered folders of a run plus the optional prompt override
#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePlan {
    mode: PipelineMode,
    folders: Vec<String>,
    prompt_override: Option<String>,
}

impl PipelinePlan {
    /// Chain the given folders in order
    pub fn chained<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: PipelineMode::Chained,
            folders: folders.into_iter().map(Into::into).collect(),
            prompt_override: None,
        }
    }

    /// Run each immediate subfolder of `parent` (resolved under `folder_base`)
    ///
    /// Subfolders run in name order; dot-prefixed directories are skipped.
    pub async fn recursive(folder_base: &Path, parent: &str) -> Result<Self> {
        let parent_path = folder_base.join(parent);
        let mut entries = tokio::fs::read_dir(&parent_path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: parent_path.display().to_string(),
                }
            } else {
                ConfigError::Read {
                    path: parent_path.display().to_string(),
                    source,
                }
            }
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            names.push(name);
        }

        if names.is_empty() {
            return Err(ConfigError::NoSubfolders {
                path: parent_path.display().to_string(),
            }
            .into());
        }

        names.sort();
        let parent = parent.trim_end_matches(&['/', '\\'][..]);

        Ok(Self {
            mode: PipelineMode::Recursive,
            folders: names
                .into_iter()
                .map(|name| format!("{}/{}", parent, name))
                .collect(),
            prompt_override: None,
        })
    }

    /// Set the prompt override; an empty string counts as no override
    pub fn with_prompt_override(mut self, prompt: Option<String>) -> Self {
        self.prompt_override = prompt.filter(|p| !p.is_empty());
        self
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// The override to use for step `index`, if the run's policy applies one
    ///
    /// Recursive runs use it for every step; chained runs only for the first.
    pub fn prompt_override_for(&self, index: usize) -> Option<&str> {
        match self.mode {
            PipelineMode::Recursive => self.prompt_override.as_deref(),
            PipelineMode::Chained if index == 0 => self.prompt_override.as_deref(),
            PipelineMode::Chained => None,
        }
    }

    /// Folder that receives step `index`'s cleaned output, if any
    pub fn forward_target(&self, index: usize) -> Option<&str> {
        match self.mode {
            PipelineMode::Chained => self.folders.get(index + 1).map(String::as_str),
            PipelineMode::Recursive => None,
        }
    }
}
