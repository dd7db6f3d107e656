//! # goll CLI
//!
//! Command-line interface for goll: run a chain of prompt folders against a
//! local Ollama-style generate endpoint.
//!
//! ## Usage
//!
//! - `goll -f summarize,translate` - Chain two folders; the first response becomes the second prompt
//! - `goll -f ask -p "Why is the sky blue?"` - Override the first folder's prompt
//! - `goll -f batch -r` - Run every subfolder of `batch` independently

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod commands;
mod config;
mod output;

use commands::{run_command, RunOptions};
use config::SettingsLoader;

/// goll - Chain local LLM generate calls, one folder per step
#[derive(Parser)]
#[command(name = "goll")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chain local LLM generate calls, one folder per step")]
#[command(long_about = None)]
struct Cli {
    /// Comma-separated list of step folders, run in order
    #[arg(short, long, required = true, value_delimiter = ',')]
    folders: Vec<String>,

    /// Prompt override for the first folder (every subfolder with --recurse)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Run each immediate subfolder of the single given folder
    #[arg(short, long)]
    recurse: bool,

    /// Enable verbose output and debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Settings file or directory path
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// API base URL override
    #[arg(long, env = "GOLL_API_BASE")]
    api_base: Option<String>,

    /// Folder base path override
    #[arg(long, env = "GOLL_FOLDER_BASE")]
    folder_base: Option<PathBuf>,

    /// Per-request timeout in seconds (0 or less disables it)
    #[arg(long, env = "GOLL_TIMEOUT", allow_negative_numbers = true)]
    timeout: Option<i64>,
}

/// Build a settings loader from CLI arguments
fn build_settings_loader(cli: &Cli) -> SettingsLoader {
    let mut loader = SettingsLoader::new();

    if let Some(path) = &cli.settings {
        loader = loader.with_settings_override(path.clone());
    }

    if let Some(api_base) = &cli.api_base {
        loader = loader.with_api_base_override(api_base.clone());
    }

    if let Some(folder_base) = &cli.folder_base {
        loader = loader.with_folder_base_override(folder_base.clone());
    }

    if let Some(timeout) = cli.timeout {
        loader = loader.with_timeout_override(timeout);
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    goll_core::init_tracing_with_debug(cli.verbose);

    let loader = build_settings_loader(&cli);
    let options = RunOptions {
        folders: cli.folders,
        prompt: cli.prompt,
        recurse: cli.recurse,
        verbose: cli.verbose,
    };

    run_command(options, loader).await
}
