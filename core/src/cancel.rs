//! Interrupt handling for a run
//!
//! One root [`CancellationToken`] lives for the whole run. The first SIGINT or
//! SIGTERM cancels it and the listener exits; everything that awaits the
//! token (the client, the spinner, the runner between steps) sees it.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Owns the run-wide cancellation token and the signal listener feeding it
pub struct CancellationController {
    token: CancellationToken,
    listener: Option<JoinHandle<()>>,
}

impl CancellationController {
    /// Create a controller without subscribing to signals
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            listener: None,
        }
    }

    /// Subscribe to process interrupt/termination requests
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen_for_signals(mut self) -> Self {
        if self.listener.is_none() {
            let token = self.token.clone();
            self.listener = Some(tokio::spawn(async move {
                tokio::select! {
                    signal = wait_for_exit_signal() => match signal {
                        Ok(name) => {
                            info!("Received exit signal: {}. Cancelling.", name);
                            token.cancel();
                        }
                        Err(e) => warn!("Failed to listen for exit signals: {}", e),
                    },
                    _ = token.cancelled() => {}
                }
            }));
        }
        self
    }

    /// A handle on the shared token
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel the run; repeated calls have no further effect
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for CancellationController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancellationController {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

#[cfg(unix)]
async fn wait_for_exit_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_exit_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_idempotent() {
        let controller = CancellationController::new();
        let token = controller.token();
        assert!(!token.is_cancelled());

        controller.cancel();
        controller.cancel();

        assert!(token.is_cancelled());
        assert!(controller.is_cancelled());
    }

    #[tokio::test]
    async fn test_listener_exits_once_token_is_cancelled() {
        let mut controller = CancellationController::new().listen_for_signals();
        controller.cancel();

        let listener = controller.listener.take().unwrap();
        tokio::time::timeout(Duration::from_secs(1), listener)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_waiters_observe_cancellation() {
        let controller = CancellationController::new().listen_for_signals();
        let token = controller.token();

        let waiter = tokio::spawn(async move { token.cancelled().await });
        controller.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
