//! Folder pipeline execution command

use crate::config::SettingsLoader;
use crate::output::{CliOutputConfig, CliOutputHandler};
use anyhow::{anyhow, bail, Result};
use goll_core::error::CancelReason;
use goll_core::{CancellationController, OllamaClient, PipelinePlan, PipelineRunner, Settings};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Everything the run command needs from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub folders: Vec<String>,
    pub prompt: Option<String>,
    pub recurse: bool,
    pub verbose: bool,
}

/// Trim folder names and drop empty entries (e.g. from `-f a,,b`)
pub fn normalize_folders(folders: &[String]) -> Vec<String> {
    folders
        .iter()
        .map(|folder| folder.trim().trim_end_matches(&['/', '\\'][..]).to_string())
        .filter(|folder| !folder.is_empty())
        .collect()
}

/// Reject flag combinations that can never run
pub fn validate_options(options: &RunOptions) -> Result<()> {
    if options.folders.is_empty() {
        bail!("At least one folder is required (-f)");
    }
    if options.recurse && options.folders.len() > 1 {
        bail!(
            "--recurse takes exactly one parent folder, got {}",
            options.folders.len()
        );
    }
    Ok(())
}

/// Every named folder must exist under the folder base before anything runs
pub fn check_folders_exist(settings: &Settings, folders: &[String]) -> Result<()> {
    for folder in folders {
        let path = settings.folder_path(folder);
        if !path.is_dir() {
            bail!("Folder does not exist: {}", path.display());
        }
    }
    Ok(())
}

/// Execute the folder pipeline
pub async fn run_command(options: RunOptions, loader: SettingsLoader) -> Result<()> {
    let options = RunOptions {
        folders: normalize_folders(&options.folders),
        ..options
    };
    validate_options(&options)?;

    let settings = loader.load().await?;
    debug!(
        "Using API base {} with folder base {}",
        settings.api_base_url,
        settings.folder_base().display()
    );
    check_folders_exist(&settings, &options.folders)?;

    let controller = CancellationController::new().listen_for_signals();

    let plan = if options.recurse {
        PipelinePlan::recursive(settings.folder_base(), &options.folders[0]).await?
    } else {
        PipelinePlan::chained(options.folders.clone())
    }
    .with_prompt_override(options.prompt.clone());

    let client = Arc::new(OllamaClient::from_settings(&settings));
    let output = Box::new(CliOutputHandler::new(
        CliOutputConfig {
            verbose: options.verbose,
        },
        controller.token(),
    ));

    let runner = PipelineRunner::new(settings, client, controller.token()).with_output(output);

    match runner.run(&plan).await {
        Ok(summary) => {
            info!("Run finished with {} step(s)", summary.steps.len());
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(match e.cancel_reason() {
                Some(CancelReason::Interrupted) => anyhow!("Run cancelled by signal: {}", e),
                Some(CancelReason::TimedOut { .. }) => anyhow!("Request timed out: {}", e),
                None => anyhow!(e),
            })
        }
    }
}
