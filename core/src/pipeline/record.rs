//! Timestamped result log written into each completed step's folder

use crate::error::{ArtifactError, Result};
use crate::llm::GenerationResult;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::step::PipelineStep;

/// Everything worth keeping about one completed step
pub struct ResultRecord<'a> {
    step: &'a PipelineStep,
    result: &'a GenerationResult,
    completed_at: DateTime<Local>,
}

impl<'a> ResultRecord<'a> {
    pub fn new(
        step: &'a PipelineStep,
        result: &'a GenerationResult,
        completed_at: DateTime<Local>,
    ) -> Self {
        Self {
            step,
            result,
            completed_at,
        }
    }

    /// `output_<date>_<time>.log`, or `output_<date>_<time>_<n>.log` for the
    /// `n`th collision within the same second
    pub fn file_name(&self, attempt: usize) -> String {
        let stamp = self.completed_at.format("%Y-%m-%d_%H-%M-%S");
        match attempt {
            0 => format!("output_{}.log", stamp),
            n => format!("output_{}_{}.log", stamp, n),
        }
    }

    /// Render the log body
    pub fn render(&self) -> Result<String> {
        let config = serde_json::to_string_pretty(&self.step.config)?;
        let tps = self
            .result
            .tokens_per_second()
            .map(|tps| format!("{:.2}", tps))
            .unwrap_or_else(|| "n/a".to_string());

        Ok(format!(
            "Prompt: {}\n\n\
             Response: {}\n\n\
             Generated {} tokens in {:.2} seconds\n\
             Tokens per second: {}\n\
             Prompt tokens: {}\n\
             Total duration: {:.2} seconds\n\
             Using model config: {}\n",
            self.step.prompt,
            self.result.output,
            self.result.eval_count,
            self.result.eval_seconds(),
            tps,
            self.result.prompt_eval_count,
            self.result.total_time().as_secs_f64(),
            config,
        ))
    }

    /// Write the log into `dir`, returning its path
    ///
    /// Never replaces an existing log.
    pub async fn write(&self, dir: &Path) -> Result<PathBuf> {
        let body = self.render()?;
        let mut attempt = 0;
        loop {
            let path = dir.join(self.file_name(attempt));
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            let mut file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("{} exists, trying next suffix", path.display());
                    attempt += 1;
                    continue;
                }
                Err(source) => {
                    return Err(ArtifactError::Write {
                        path: path.display().to_string(),
                        source,
                    }
                    .into())
                }
            };

            let written = async {
                file.write_all(body.as_bytes()).await?;
                file.flush().await
            }
            .await;
            written.map_err(|source| ArtifactError::Write {
                path: path.display().to_string(),
                source,
            })?;
            return Ok(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelOptions, StepConfig};
    use crate::pipeline::step::PromptSource;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::tempdir;

    fn step(path: PathBuf) -> PipelineStep {
        PipelineStep {
            index: 0,
            folder: "a".to_string(),
            path,
            config: StepConfig {
                model: "llama3".to_string(),
                options: ModelOptions::default(),
                system: "sys".to_string(),
                format: None,
            },
            prompt: "What is 2+2?".to_string(),
            prompt_source: PromptSource::File,
        }
    }

    fn result(eval_duration: u64) -> GenerationResult {
        serde_json::from_value(json!({
            "model": "llama3",
            "created_at": "2024-05-01T10:20:30Z",
            "response": "4",
            "done": true,
            "prompt_eval_count": 7,
            "eval_count": 50,
            "eval_duration": eval_duration
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_write_log_with_metrics() {
        let dir = tempdir().unwrap();
        let step = step(dir.path().to_path_buf());
        let result = result(1_000_000_000);
        let completed_at = Local.with_ymd_and_hms(2024, 5, 1, 9, 8, 7).unwrap();

        let record = ResultRecord::new(&step, &result, completed_at);
        let path = record.write(dir.path()).await.unwrap();

        assert_eq!(path.file_name().unwrap(), "output_2024-05-01_09-08-07.log");
        let body = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(body.contains("Prompt: What is 2+2?"));
        assert!(body.contains("Response: 4"));
        assert!(body.contains("Generated 50 tokens in 1.00 seconds"));
        assert!(body.contains("Tokens per second: 50.00"));
        assert!(body.contains("Prompt tokens: 7"));
        assert!(body.contains("\"model\": \"llama3\""));
    }

    #[tokio::test]
    async fn test_same_second_logs_get_distinct_names() {
        let dir = tempdir().unwrap();
        let step = step(dir.path().to_path_buf());
        let result = result(1_000_000_000);
        let completed_at = Local.with_ymd_and_hms(2024, 5, 1, 9, 8, 7).unwrap();

        let first = ResultRecord::new(&step, &result, completed_at)
            .write(dir.path())
            .await
            .unwrap();
        let second = ResultRecord::new(&step, &result, completed_at)
            .write(dir.path())
            .await
            .unwrap();

        assert_eq!(first.file_name().unwrap(), "output_2024-05-01_09-08-07.log");
        assert_eq!(second.file_name().unwrap(), "output_2024-05-01_09-08-07_1.log");
    }

    #[test]
    fn test_zero_eval_duration_renders_undefined_rate() {
        let step = step(PathBuf::from("."));
        let result = result(0);
        let record = ResultRecord::new(&step, &result, Local::now());

        let body = record.render().unwrap();
        assert!(body.contains("Tokens per second: n/a"));
    }

    #[tokio::test]
    async fn test_write_into_missing_dir_is_artifact_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone");
        let step = step(missing.clone());
        let result = result(1);

        let err = ResultRecord::new(&step, &result, Local::now())
            .write(&missing)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::Artifact(_)));
    }
}
