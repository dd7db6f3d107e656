//! Progress spinner shown while a generate request is in flight
//!
//! The spinner runs as its own task. The only things it shares with the rest
//! of the CLI are the [`SpinnerSignal`] channel and the run's cancellation
//! token.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const TICK_INTERVAL: Duration = Duration::from_millis(100);
const TICK_STRINGS: &[&str] = &["|", "/", "-", "\\", " "];

/// What the spinner should currently be doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinnerSignal {
    Idle,
    Spinning(String),
}

/// Handle on the background spinner task
pub struct Spinner {
    signal: watch::Sender<SpinnerSignal>,
    visible: watch::Receiver<bool>,
    task: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Spinner that draws only when stdout is a terminal
    pub fn new(cancel: CancellationToken) -> Self {
        Self::with_enabled(cancel, console::Term::stdout().is_term())
    }

    /// Spinner with explicit enablement; a disabled spinner only tracks state
    pub fn with_enabled(cancel: CancellationToken, enabled: bool) -> Self {
        let (signal, signal_rx) = watch::channel(SpinnerSignal::Idle);
        let (visible_tx, visible) = watch::channel(false);
        let task = enabled.then(|| tokio::spawn(drive(signal_rx, visible_tx, cancel)));

        Self {
            signal,
            visible,
            task,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.task.is_some()
    }

    #[cfg(test)]
    pub fn is_spinning(&self) -> bool {
        matches!(*self.signal.borrow(), SpinnerSignal::Spinning(_))
    }

    /// Start (or relabel) the spinner
    pub fn start(&self, message: impl Into<String>) {
        self.signal
            .send_replace(SpinnerSignal::Spinning(message.into()));
    }

    /// Stop the spinner and wait until its line is cleared
    pub async fn stop(&self) {
        self.signal.send_replace(SpinnerSignal::Idle);
        if self.task.is_some() {
            let mut visible = self.visible.clone();
            // Err means the task already exited and cleared its line.
            let _ = visible.wait_for(|shown| !*shown).await;
        }
    }
}

fn new_bar(message: String) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .tick_strings(TICK_STRINGS)
        .template("{spinner} {msg}")
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to create spinner template: {}", e);
            ProgressStyle::default_spinner()
        });
    let bar = ProgressBar::new_spinner();
    bar.set_style(style);
    bar.set_message(message);
    bar
}

/// Spinner task body; exits on cancellation or when the handle is dropped
async fn drive(
    mut signal: watch::Receiver<SpinnerSignal>,
    visible: watch::Sender<bool>,
    cancel: CancellationToken,
) {
    let mut bar: Option<ProgressBar> = None;
    let mut ticker = tokio::time::interval(TICK_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = signal.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = signal.borrow_and_update().clone();
                match next {
                    SpinnerSignal::Spinning(message) => {
                        match &bar {
                            Some(existing) => existing.set_message(message),
                            None => bar = Some(new_bar(message)),
                        }
                        visible.send_replace(true);
                    }
                    SpinnerSignal::Idle => {
                        if let Some(done) = bar.take() {
                            done.finish_and_clear();
                        }
                        visible.send_replace(false);
                    }
                }
            }
            _ = ticker.tick(), if bar.is_some() => {
                if let Some(active) = &bar {
                    active.tick();
                }
            }
        }
    }

    if let Some(done) = bar.take() {
        done.finish_and_clear();
    }
    visible.send_replace(false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_spinner_tracks_state() {
        let spinner = Spinner::with_enabled(CancellationToken::new(), false);
        assert!(!spinner.is_enabled());
        assert!(!spinner.is_spinning());

        spinner.start("waiting");
        assert!(spinner.is_spinning());

        spinner.stop().await;
        assert!(!spinner.is_spinning());
    }

    #[tokio::test]
    async fn test_stop_waits_for_clear() {
        let spinner = Spinner::with_enabled(CancellationToken::new(), true);
        spinner.start("waiting");

        let mut visible = spinner.visible.clone();
        tokio::time::timeout(Duration::from_secs(1), visible.wait_for(|shown| *shown))
            .await
            .unwrap()
            .unwrap();

        spinner.stop().await;
        assert!(!*spinner.visible.borrow());
    }

    #[tokio::test]
    async fn test_cancel_ends_task() {
        let cancel = CancellationToken::new();
        let mut spinner = Spinner::with_enabled(cancel.clone(), true);
        spinner.start("waiting");

        cancel.cancel();
        let task = spinner.task.take().unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();

        // Stopping after the task is gone returns immediately
        spinner.stop().await;
    }
}
