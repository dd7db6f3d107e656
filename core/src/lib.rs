//! # goll Core
//!
//! Core library for goll - chain prompts through a local LLM generate API.
//!
//! Each step of a pipeline is a folder holding the model configuration and
//! prompt texts. A run sends one generate request per folder, in order, and
//! can forward each output as the next folder's prompt.

// Core modules
pub mod cancel;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;

// Re-export commonly used types
pub use cancel::CancellationController;
pub use config::{ModelOptions, OutputFormat, Settings, StepConfig};
pub use error::{Error, Result};
pub use llm::{GenerationClient, GenerationRequest, GenerationResult, OllamaClient};
pub use pipeline::{PipelineMode, PipelinePlan, PipelineRunner, RunSummary};

/// Current version of the goll-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing on stderr; `RUST_LOG` wins over the debug flag
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
