//! Parsed generate response and derived metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Non-streamed response of the generate endpoint
///
/// Durations are nanoseconds as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Model that produced the output
    pub model: String,

    /// Server-side creation time
    pub created_at: DateTime<Utc>,

    /// Generated text
    #[serde(rename = "response")]
    pub output: String,

    /// Whether generation completed
    #[serde(default)]
    pub done: bool,

    #[serde(default)]
    pub total_duration: u64,

    #[serde(default)]
    pub load_duration: u64,

    #[serde(default)]
    pub prompt_eval_count: u64,

    #[serde(default)]
    pub prompt_eval_duration: u64,

    /// Number of generated tokens
    #[serde(default)]
    pub eval_count: u64,

    /// Time spent generating, in nanoseconds
    #[serde(default)]
    pub eval_duration: u64,
}

impl GenerationResult {
    /// Generation time in seconds
    pub fn eval_seconds(&self) -> f64 {
        self.eval_duration as f64 / 1e9
    }

    /// Output tokens per second, `None` when no eval time was reported
    pub fn tokens_per_second(&self) -> Option<f64> {
        if self.eval_duration == 0 {
            return None;
        }
        Some(self.eval_count as f64 / self.eval_seconds())
    }

    /// Wall-clock time of the whole request on the server
    pub fn total_time(&self) -> Duration {
        Duration::from_nanos(self.total_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(eval_count: u64, eval_duration: u64) -> GenerationResult {
        serde_json::from_value(json!({
            "model": "llama3",
            "created_at": "2024-05-01T10:20:30.123456789Z",
            "response": "hi",
            "done": true,
            "eval_count": eval_count,
            "eval_duration": eval_duration
        }))
        .unwrap()
    }

    #[test]
    fn test_tokens_per_second() {
        let tps = result(50, 1_000_000_000).tokens_per_second().unwrap();
        assert_eq!(format!("{:.2}", tps), "50.00");
    }

    #[test]
    fn test_tokens_per_second_undefined_for_zero_duration() {
        assert_eq!(result(50, 0).tokens_per_second(), None);
        assert_eq!(result(0, 0).tokens_per_second(), None);
    }

    #[test]
    fn test_decode_full_body() {
        let parsed: GenerationResult = serde_json::from_value(json!({
            "model": "llama3",
            "created_at": "2024-05-01T10:20:30Z",
            "response": "The sky is blue.",
            "done": true,
            "total_duration": 5_000_000_000u64,
            "load_duration": 1_000_000u64,
            "prompt_eval_count": 26,
            "prompt_eval_duration": 130_000_000u64,
            "eval_count": 259,
            "eval_duration": 4_000_000_000u64,
            "context": [1, 2, 3]
        }))
        .unwrap();

        assert_eq!(parsed.output, "The sky is blue.");
        assert_eq!(parsed.prompt_eval_count, 26);
        assert_eq!(parsed.total_time(), Duration::from_secs(5));
        assert_eq!(parsed.eval_seconds(), 4.0);
    }
}
