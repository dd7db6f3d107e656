//! Sequential step execution with prompt forwarding

use crate::config::{Settings, PROMPT_FILE};
use crate::error::{ArtifactError, CancelReason, Error, LlmError, PipelineError, Result};
use crate::llm::GenerationClient;
use crate::output::{NullOutput, PipelineEvent, PipelineOutput};
use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::plan::PipelinePlan;
use super::reasoning::strip_reasoning;
use super::record::ResultRecord;
use super::step::PipelineStep;

/// What one completed step produced
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub folder: String,
    pub model: String,
    pub eval_count: u64,
    pub tokens_per_second: Option<f64>,
    pub log_path: PathBuf,
    pub forwarded_to: Option<PathBuf>,
}

/// Outcome of a fully successful run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub steps: Vec<StepOutcome>,
}

/// Walks a [`PipelinePlan`] one step at a time
///
/// Any failure stops the run; later steps are never touched.
pub struct PipelineRunner {
    settings: Settings,
    client: Arc<dyn GenerationClient>,
    cancel: CancellationToken,
    output: Box<dyn PipelineOutput>,
}

impl PipelineRunner {
    /// Create a runner that discards progress events
    pub fn new(
        settings: Settings,
        client: Arc<dyn GenerationClient>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            settings,
            client,
            cancel,
            output: Box::new(NullOutput),
        }
    }

    /// Report progress to the given output handler
    pub fn with_output(mut self, output: Box<dyn PipelineOutput>) -> Self {
        self.output = output;
        self
    }

    /// Run every step of `plan` in order
    pub async fn run(&self, plan: &PipelinePlan) -> Result<RunSummary> {
        info!(
            "Running {} step(s) in {:?} mode via {}",
            plan.len(),
            plan.mode(),
            self.client.provider_name()
        );
        self.emit(PipelineEvent::RunStarted {
            mode: plan.mode(),
            total_steps: plan.len(),
        })
        .await;

        let mut summary = RunSummary::default();
        for (index, folder) in plan.folders().iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("Run cancelled before step '{}'", folder);
                let cancelled = LlmError::Cancelled {
                    reason: CancelReason::Interrupted,
                };
                return Err(PipelineError::step(folder.clone(), cancelled.into()).into());
            }

            let outcome = self
                .run_step(plan, index)
                .await
                .map_err(|e| Error::from(PipelineError::step(folder.clone(), e)))?;
            summary.steps.push(outcome);
        }

        self.emit(PipelineEvent::RunFinished {
            summary: summary.clone(),
        })
        .await;
        self.flush().await;

        Ok(summary)
    }

    async fn run_step(&self, plan: &PipelinePlan, index: usize) -> Result<StepOutcome> {
        let step = PipelineStep::resolve(plan, index, &self.settings).await?;
        self.emit(PipelineEvent::StepStarted {
            index,
            total_steps: plan.len(),
            folder: step.folder.clone(),
            config: step.config.clone(),
            prompt: step.prompt.clone(),
        })
        .await;

        let request = step.request();
        self.emit(PipelineEvent::RequestStarted {
            folder: step.folder.clone(),
        })
        .await;
        let response = self.client.generate(&request, &self.cancel).await;
        self.emit(PipelineEvent::RequestFinished {
            folder: step.folder.clone(),
            success: response.is_ok(),
        })
        .await;
        let result = response?;
        self.emit(PipelineEvent::ResponseReceived {
            folder: step.folder.clone(),
            result: result.clone(),
        })
        .await;

        let forwarded_to = match plan.forward_target(index) {
            Some(next) => {
                let path = self.settings.folder_path(next).join(PROMPT_FILE);
                let cleaned = strip_reasoning(&result.output);
                tokio::fs::write(&path, cleaned)
                    .await
                    .map_err(|source| ArtifactError::Write {
                        path: path.display().to_string(),
                        source,
                    })?;
                debug!("Forwarded output of '{}' to {}", step.folder, path.display());
                self.emit(PipelineEvent::PromptForwarded {
                    from: step.folder.clone(),
                    to: next.to_string(),
                    path: path.clone(),
                })
                .await;
                Some(path)
            }
            None => None,
        };

        let log_path = ResultRecord::new(&step, &result, Local::now())
            .write(&step.path)
            .await?;
        self.emit(PipelineEvent::ResultRecorded {
            folder: step.folder.clone(),
            path: log_path.clone(),
        })
        .await;

        let outcome = StepOutcome {
            folder: step.folder.clone(),
            model: step.config.model.clone(),
            eval_count: result.eval_count,
            tokens_per_second: result.tokens_per_second(),
            log_path,
            forwarded_to,
        };

        debug!("Step {} ({}) completed", index, step.folder);
        self.emit(PipelineEvent::StepCompleted {
            index,
            outcome: outcome.clone(),
        })
        .await;

        Ok(outcome)
    }

    /// Output failures are logged, never fatal to the run
    async fn emit(&self, event: PipelineEvent) {
        if let Err(e) = self.output.emit_event(event).await {
            warn!("Failed to emit pipeline event: {}", e);
        }
    }

    async fn flush(&self) {
        if let Err(e) = self.output.flush().await {
            warn!("Failed to flush pipeline output: {}", e);
        }
    }
}
