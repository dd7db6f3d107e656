//! Error types and handling for goll core

use std::time::Duration;
use thiserror::Error;

/// Result type alias for goll operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for goll core
#[derive(Error, Debug)]
pub enum Error {
    /// Folder artifact or settings errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generate endpoint errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Failure persisting a forwarded prompt or result record
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// A step failed; carries the folder it failed in
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Why the run was cancelled, if this error is (or wraps) a cancellation
    pub fn cancel_reason(&self) -> Option<&CancelReason> {
        match self {
            Error::Llm(LlmError::Cancelled { reason }) => Some(reason),
            Error::Pipeline(PipelineError::Step { source, .. }) => source.cancel_reason(),
            _ => None,
        }
    }

    /// Whether this error is (or wraps) a cancellation
    pub fn is_cancelled(&self) -> bool {
        self.cancel_reason().is_some()
    }

    /// HTTP status returned by the generate endpoint, if that is what failed
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::Llm(LlmError::UpstreamStatus { status }) => Some(*status),
            Error::Pipeline(PipelineError::Step { source, .. }) => source.upstream_status(),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("No subfolders found in {path}")]
    NoSubfolders { path: String },
}

/// Why an in-flight request was abandoned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelReason {
    /// The run-wide token was cancelled, usually by an interrupt signal
    Interrupted,
    /// The per-request bound elapsed
    TimedOut { after: Duration },
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Interrupted => write!(f, "interrupted by signal"),
            CancelReason::TimedOut { after } => {
                write!(f, "timed out after {}s", after.as_secs_f64())
            }
        }
    }
}

/// Generate endpoint errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Unexpected response status: {status}")]
    UpstreamStatus { status: u16 },

    #[error("Failed to decode response body: {message}")]
    Decode { message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request cancelled: {reason}")]
    Cancelled { reason: CancelReason },
}

/// Artifact persistence errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors enriched with the identity of the failing step
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("step '{folder}' failed: {source}")]
    Step {
        folder: String,
        #[source]
        source: Box<Error>,
    },
}

impl PipelineError {
    /// Wrap an error with the folder of the step that produced it
    pub fn step(folder: impl Into<String>, source: Error) -> Self {
        PipelineError::Step {
            folder: folder.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_reason_survives_step_wrapping() {
        let inner: Error = LlmError::Cancelled {
            reason: CancelReason::TimedOut {
                after: Duration::from_secs(5),
            },
        }
        .into();
        let wrapped: Error = PipelineError::step("summarize", inner).into();

        assert!(wrapped.is_cancelled());
        assert_eq!(
            wrapped.cancel_reason(),
            Some(&CancelReason::TimedOut {
                after: Duration::from_secs(5)
            })
        );
        assert!(wrapped.to_string().contains("summarize"));
        assert!(wrapped.to_string().contains("timed out after 5s"));
    }

    #[test]
    fn test_upstream_status_lookup() {
        let wrapped: Error =
            PipelineError::step("b", LlmError::UpstreamStatus { status: 500 }.into()).into();
        assert_eq!(wrapped.upstream_status(), Some(500));
        assert!(!wrapped.is_cancelled());
    }
}
