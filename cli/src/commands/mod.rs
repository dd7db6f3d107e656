//! CLI command implementations

pub mod run;

pub use run::{run_command, RunOptions};
