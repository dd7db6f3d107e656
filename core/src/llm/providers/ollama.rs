//! Ollama generate client implementation

use crate::config::Settings;
use crate::error::{CancelReason, LlmError, Result};
use crate::llm::{GenerationClient, GenerationRequest, GenerationResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Client for a local Ollama-compatible `/generate` endpoint
pub struct OllamaClient {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl OllamaClient {
    /// Create a new client; `timeout` of `None` leaves only run-wide cancellation
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Create a client from process-wide settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_base_url.clone(), settings.timeout_duration())
    }

    /// Use a preconfigured HTTP transport
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn endpoint(&self) -> String {
        format!("{}/generate", self.base_url.trim_end_matches('/'))
    }

    /// One POST, without any bound applied
    async fn exchange(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let endpoint = self.endpoint();
        tracing::debug!("POST {} (model: {})", endpoint, request.model());

        let response = self
            .client
            .post(&endpoint)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::error!("Generate endpoint returned {}", status);
            return Err(LlmError::UpstreamStatus {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(|e| LlmError::Network {
            message: format!("Failed to read response body: {}", e),
        })?;

        let result: GenerationResult =
            serde_json::from_slice(&body).map_err(|e| LlmError::Decode {
                message: e.to_string(),
            })?;

        tracing::debug!(
            "Generated {} tokens in {:.2}s",
            result.eval_count,
            result.eval_seconds()
        );

        Ok(result)
    }
}

#[async_trait]
impl GenerationClient for OllamaClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult> {
        if cancel.is_cancelled() {
            return Err(LlmError::Cancelled {
                reason: CancelReason::Interrupted,
            }
            .into());
        }

        let exchange = self.exchange(request);
        let bounded = async {
            match self.timeout {
                Some(after) => match tokio::time::timeout(after, exchange).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!("Request to {} timed out after {:?}", self.endpoint(), after);
                        Err(LlmError::Cancelled {
                            reason: CancelReason::TimedOut { after },
                        }
                        .into())
                    }
                },
                None => exchange.await,
            }
        };

        // Dropping the losing branch aborts the in-flight request
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LlmError::Cancelled {
                reason: CancelReason::Interrupted,
            }
            .into()),
            result = bounded => result,
        }
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelOptions;
    use crate::error::Error;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ok_body(text: &str) -> serde_json::Value {
        json!({
            "model": "llama3",
            "created_at": "2024-05-01T10:20:30.5Z",
            "response": text,
            "done": true,
            "total_duration": 2_000_000_000u64,
            "load_duration": 10_000_000u64,
            "prompt_eval_count": 12,
            "prompt_eval_duration": 100_000_000u64,
            "eval_count": 50,
            "eval_duration": 1_000_000_000u64
        })
    }

    fn request() -> GenerationRequest {
        GenerationRequest::builder("llama3")
            .with_options(ModelOptions::default())
            .with_system("sys")
            .with_prompt("hello")
            .build()
    }

    #[tokio::test]
    async fn test_generate_posts_json_and_parses_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({
                "model": "llama3",
                "prompt": "hello",
                "system": "sys",
                "stream": false,
                "raw": false,
                "options": { "num_ctx": 2048 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("world")))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(format!("{}/api", server.uri()), None);
        let result = client
            .generate(&request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.output, "world");
        assert_eq!(result.eval_count, 50);
        assert_eq!(format!("{:.2}", result.tokens_per_second().unwrap()), "50.00");
    }

    #[tokio::test]
    async fn test_non_200_is_upstream_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_json(ok_body("ignored")))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), Some(Duration::from_secs(5)));
        let err = client
            .generate(&request(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Llm(LlmError::UpstreamStatus { status: 500 })
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(format!("{}/", server.uri()), None);
        let err = client
            .generate(&request(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Llm(LlmError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_timeout_is_reported_as_timed_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body("late"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let after = Duration::from_millis(100);
        let client = OllamaClient::new(server.uri(), Some(after));
        let err = client
            .generate(&request(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.cancel_reason(), Some(&CancelReason::TimedOut { after }));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_in_flight_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body("late"))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), Some(Duration::from_secs(30)));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = client.generate(&request(), &cancel).await.unwrap_err();

        assert_eq!(err.cancel_reason(), Some(&CancelReason::Interrupted));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_already_cancelled_token_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("x")))
            .expect(0)
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), None);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client.generate(&request(), &cancel).await.unwrap_err();
        assert_eq!(err.cancel_reason(), Some(&CancelReason::Interrupted));
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings::new("http://localhost:11434/api", "prompts").with_timeout(0);
        let client = OllamaClient::from_settings(&settings);
        assert_eq!(client.base_url(), "http://localhost:11434/api");
        assert_eq!(client.timeout(), None);
        assert_eq!(client.endpoint(), "http://localhost:11434/api/generate");
    }
}
