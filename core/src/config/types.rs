//! Sampling options and structured-output schema sent with every generate call

use serde::{Deserialize, Serialize};

/// Sampling parameters for the generate endpoint
///
/// The four defaulted fields are always serialized, zero included, since the
/// server treats an omitted field differently from an explicit `0`. Everything
/// else is only sent when a folder sets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    /// Size of the context window used to generate the next token (default 2048)
    pub num_ctx: i64,
    /// How far back to look to prevent repetition (default 64, 0 = off, -1 = num_ctx)
    pub repeat_last_n: i64,
    /// How strongly to penalize repetitions (default 1.1)
    pub repeat_penalty: f64,
    /// Sampling temperature (default 0.8)
    pub temperature: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_p: Option<f64>,
    /// Mirostat sampling mode (0 = off, 1 = Mirostat, 2 = Mirostat 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat_eta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat_tau: Option<f64>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl ModelOptions {
    pub const DEFAULT_NUM_CTX: i64 = 2048;
    pub const DEFAULT_REPEAT_LAST_N: i64 = 64;
    pub const DEFAULT_REPEAT_PENALTY: f64 = 1.1;
    pub const DEFAULT_TEMPERATURE: f64 = 0.8;
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            num_ctx: Self::DEFAULT_NUM_CTX,
            repeat_last_n: Self::DEFAULT_REPEAT_LAST_N,
            repeat_penalty: Self::DEFAULT_REPEAT_PENALTY,
            temperature: Self::DEFAULT_TEMPERATURE,
            top_k: None,
            top_p: None,
            min_p: None,
            mirostat: None,
            mirostat_eta: None,
            mirostat_tau: None,
            num_predict: None,
            seed: None,
            stop: None,
        }
    }
}

/// Structured-output schema: a type tag, named property schemas and the
/// names that must be present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFormat {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl OutputFormat {
    /// A schema without a type tag carries no constraint
    pub fn is_empty(&self) -> bool {
        self.kind.trim().is_empty()
    }
}
