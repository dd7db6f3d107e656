//! CLI output handler implementation

use super::spinner::Spinner;
use async_trait::async_trait;
use console::style;
use goll_core::output::{PipelineEvent, PipelineOutput};
use goll_core::{GenerationResult, PipelineMode};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// CLI output configuration
#[derive(Debug, Clone, Default)]
pub struct CliOutputConfig {
    /// Print each step's model config and prompt
    pub verbose: bool,
}

/// CLI output handler that renders pipeline events for the terminal
pub struct CliOutputHandler {
    config: CliOutputConfig,
    spinner: Spinner,
}

impl CliOutputHandler {
    /// Create a handler whose spinner stops with `cancel`
    pub fn new(config: CliOutputConfig, cancel: CancellationToken) -> Self {
        Self::with_spinner(config, Spinner::new(cancel))
    }

    /// Create with an explicit spinner
    pub fn with_spinner(config: CliOutputConfig, spinner: Spinner) -> Self {
        debug!("Spinner enabled: {}", spinner.is_enabled());
        Self { config, spinner }
    }
}

fn mode_label(mode: PipelineMode) -> &'static str {
    match mode {
        PipelineMode::Chained => "chained",
        PipelineMode::Recursive => "recursive",
    }
}

/// Token count, eval time and rate lines shown after a response
pub fn format_metrics(result: &GenerationResult) -> String {
    let rate = result
        .tokens_per_second()
        .map(|tps| format!("{:.2}", tps))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "Generated {} tokens in {:.2} seconds\nTokens per second: {}",
        result.eval_count,
        result.eval_seconds(),
        rate
    )
}

#[async_trait]
impl PipelineOutput for CliOutputHandler {
    async fn emit_event(
        &self,
        event: PipelineEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match event {
            PipelineEvent::RunStarted { mode, total_steps } => {
                println!(
                    "{} {} step(s), {}",
                    style("goll").bold().cyan(),
                    total_steps,
                    mode_label(mode)
                );
            }
            PipelineEvent::StepStarted {
                index,
                total_steps,
                folder,
                config,
                prompt,
            } => {
                println!(
                    "\n{} Generating response using folder {}",
                    style(format!("[{}/{}]", index + 1, total_steps)).dim(),
                    style(&folder).bold()
                );
                if self.config.verbose {
                    println!(
                        "Using model config: {}",
                        serde_json::to_string_pretty(&config)?
                    );
                    println!("Prompt: {}", prompt);
                }
            }
            PipelineEvent::RequestStarted { folder } => {
                self.spinner.start(format!("Waiting for {}", folder));
            }
            PipelineEvent::RequestFinished { .. } => {
                self.spinner.stop().await;
            }
            PipelineEvent::ResponseReceived { result, .. } => {
                println!("{}\n{}", style("Response:").bold(), result.output);
                println!("{}", format_metrics(&result));
            }
            PipelineEvent::PromptForwarded { to, path, .. } => {
                println!("Response written to {} ({})", path.display(), to);
            }
            PipelineEvent::ResultRecorded { path, .. } => {
                println!("Output written to {}", path.display());
            }
            PipelineEvent::StepCompleted { outcome, .. } => {
                println!(
                    "{} {} completed successfully",
                    style("✓").green(),
                    outcome.folder
                );
            }
            PipelineEvent::RunFinished { summary } => {
                println!(
                    "\n{} All {} step(s) completed",
                    style("✓").green().bold(),
                    summary.steps.len()
                );
            }
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        use std::io::Write;
        self.spinner.stop().await;
        std::io::stdout().flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(eval_count: u64, eval_duration: u64) -> GenerationResult {
        serde_json::from_value(json!({
            "model": "llama3",
            "created_at": "2024-05-01T10:20:30Z",
            "response": "ok",
            "done": true,
            "eval_count": eval_count,
            "eval_duration": eval_duration
        }))
        .unwrap()
    }

    #[test]
    fn test_format_metrics() {
        let text = format_metrics(&result(50, 2_000_000_000));
        assert_eq!(
            text,
            "Generated 50 tokens in 2.00 seconds\nTokens per second: 25.00"
        );
    }

    #[test]
    fn test_format_metrics_without_duration() {
        let text = format_metrics(&result(3, 0));
        assert!(text.ends_with("Tokens per second: n/a"));
    }

    #[test]
    fn test_mode_label() {
        assert_eq!(mode_label(PipelineMode::Chained), "chained");
        assert_eq!(mode_label(PipelineMode::Recursive), "recursive");
    }

    #[tokio::test]
    async fn test_request_events_drive_spinner() {
        let spinner = Spinner::with_enabled(CancellationToken::new(), false);
        let handler = CliOutputHandler::with_spinner(CliOutputConfig::default(), spinner);

        handler
            .emit_event(PipelineEvent::RequestStarted {
                folder: "a".to_string(),
            })
            .await
            .unwrap();
        assert!(handler.spinner.is_spinning());

        handler
            .emit_event(PipelineEvent::RequestFinished {
                folder: "a".to_string(),
                success: false,
            })
            .await
            .unwrap();
        assert!(!handler.spinner.is_spinning());
    }
}
