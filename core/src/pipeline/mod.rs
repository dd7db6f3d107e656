//! Folder pipelines: plan, resolve, request, forward, record

pub mod plan;
pub mod reasoning;
pub mod record;
pub mod runner;
pub mod step;

pub use plan::{PipelineMode, PipelinePlan};
pub use reasoning::strip_reasoning;
pub use record::ResultRecord;
pub use runner::{PipelineRunner, RunSummary, StepOutcome};
pub use step::{PipelineStep, PromptSource};
