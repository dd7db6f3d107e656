//! Configuration for goll core
//!
//! Settings are plain data; step folders are loaded here because the
//! pipeline resolves them one step at a time.

pub mod settings;
pub mod step;
pub mod types;

pub use settings::{Settings, DEFAULT_TIMEOUT_SECS};
pub use step::{StepConfig, CONFIG_FILE, FORMAT_FILE, PROMPT_FILE, SYSTEM_FILE};
pub use types::{ModelOptions, OutputFormat};
