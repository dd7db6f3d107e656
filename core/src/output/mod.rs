//! Output abstraction layer for goll core
//!
//! The runner reports progress as [`PipelineEvent`]s. Core only provides the
//! abstraction; the CLI decides how to render it.

use crate::config::StepConfig;
use crate::llm::GenerationResult;
use crate::pipeline::{PipelineMode, RunSummary, StepOutcome};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;

/// Events emitted while a pipeline runs
#[derive(Debug, Clone, Serialize)]
pub enum PipelineEvent {
    /// The run is about to start its first step
    RunStarted { mode: PipelineMode, total_steps: usize },
    /// A step's configuration and prompt were resolved
    StepStarted {
        index: usize,
        total_steps: usize,
        folder: String,
        config: StepConfig,
        prompt: String,
    },
    /// The generate request was sent
    RequestStarted { folder: String },
    /// The generate request returned, successfully or not
    RequestFinished { folder: String, success: bool },
    /// The endpoint answered; emitted before any artifact is written
    ResponseReceived {
        folder: String,
        result: GenerationResult,
    },
    /// The cleaned output was written as the next step's prompt
    PromptForwarded {
        from: String,
        to: String,
        path: PathBuf,
    },
    /// The result log was written
    ResultRecorded { folder: String, path: PathBuf },
    /// A step finished all of its work
    StepCompleted { index: usize, outcome: StepOutcome },
    /// Every step completed
    RunFinished { summary: RunSummary },
}

/// Receiver of pipeline events
#[async_trait]
pub trait PipelineOutput: Send + Sync {
    /// Handle one event
    async fn emit_event(
        &self,
        event: PipelineEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Flush any buffered output
    async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Null output handler that discards all events
pub struct NullOutput;

#[async_trait]
impl PipelineOutput for NullOutput {
    async fn emit_event(
        &self,
        _event: PipelineEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
