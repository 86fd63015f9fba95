//! Trailing-edge debouncing for keystroke-driven fetches.

use std::{future::Future, time::Duration};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Runs only the most recently scheduled future, once `delay` has passed
/// without another schedule.
///
/// Each [`Debouncer::schedule`] cancels the pending one and restarts the
/// timer. A future that has already started running is not interrupted.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule<F>(&self, fut: F) -> DebounceHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().replace(token.clone()) {
            trace!("Superseding pending debounced call");
            previous.cancel();
        }

        let delay = self.delay;
        let task_token = token.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => None,
                _ = tokio::time::sleep(delay) => Some(fut.await),
            }
        });

        DebounceHandle { token, task }
    }

    /// Cancel whatever is pending.
    pub fn cancel(&self) {
        if let Some(token) = self.pending.lock().take() {
            token.cancel();
        }
    }
}

/// Handle to one scheduled call.
#[derive(Debug)]
pub struct DebounceHandle<T> {
    token: CancellationToken,
    task: JoinHandle<Option<T>>,
}

impl<T> DebounceHandle<T> {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// `Some(output)` if the call ran, `None` if it was superseded or
    /// cancelled first.
    pub async fn wait(self) -> Option<T> {
        self.task.await.ok().flatten()
    }
}
