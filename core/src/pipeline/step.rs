//! A resolved step: folder, configuration and the prompt it will send

use crate::config::step::read_artifact;
use crate::config::{Settings, StepConfig, PROMPT_FILE};
use crate::error::Result;
use crate::llm::{GenerationRequest, RequestBuilder};
use std::path::PathBuf;
use tracing::debug;

use super::plan::PipelinePlan;

/// Where a step's prompt came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    /// The invocation-time override
    Override,
    /// The folder's `prompt.txt`, possibly written by the previous step
    File,
}

/// One folder's configuration and resolved prompt
#[derive(Debug, Clone)]
pub struct PipelineStep {
    pub index: usize,
    pub folder: String,
    pub path: PathBuf,
    pub config: StepConfig,
    pub prompt: String,
    pub prompt_source: PromptSource,
}

impl PipelineStep {
    /// Load step `index` of `plan`
    ///
    /// The override wins when the plan applies one to this step; otherwise
    /// `prompt.txt` must exist.
    pub async fn resolve(plan: &PipelinePlan, index: usize, settings: &Settings) -> Result<Self> {
        let folder = plan.folders()[index].clone();
        let path = settings.folder_path(&folder);

        let (prompt, prompt_source) = match plan.prompt_override_for(index) {
            Some(prompt) => (prompt.to_string(), PromptSource::Override),
            None => (read_artifact(&path.join(PROMPT_FILE)).await?, PromptSource::File),
        };

        let config = StepConfig::load(&path).await?;

        debug!(
            "Resolved step {} ({}) with prompt from {:?}",
            index, folder, prompt_source
        );

        Ok(Self {
            index,
            folder,
            path,
            config,
            prompt,
            prompt_source,
        })
    }

    /// Build the generate request for this step
    pub fn request(&self) -> GenerationRequest {
        RequestBuilder::from_step(&self.config)
            .with_prompt(self.prompt.clone())
            .build()
    }
}
