//! Generation client trait

use crate::error::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::request::GenerationRequest;
use super::response::GenerationResult;

/// Trait for generate-endpoint clients
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Perform one synchronous request/response exchange
    ///
    /// Fails with a cancellation error if `cancel` fires or the client's
    /// per-request bound elapses before the exchange completes. No retries.
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult>;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}
