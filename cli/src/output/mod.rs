//! Terminal rendering of pipeline progress

pub mod cli_handler;
pub mod spinner;

pub use cli_handler::{CliOutputConfig, CliOutputHandler};
