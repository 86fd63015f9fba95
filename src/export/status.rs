use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

/// How long a success indicator stays up before reverting to idle.
pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Exporting,
    Success,
    Error(String),
}

/// Transient export indicator.
///
/// Success reverts to idle after [`SUCCESS_DISPLAY`]; an error stays until
/// dismissed or replaced by the next attempt. Clones share state.
#[derive(Debug, Clone)]
pub struct ExportStatus {
    inner: Arc<Mutex<StatusInner>>,
    success_display: Duration,
}

#[derive(Debug)]
struct StatusInner {
    state: ExportState,
    generation: u64,
}

impl Default for ExportStatus {
    fn default() -> Self {
        Self::new(SUCCESS_DISPLAY)
    }
}

impl ExportStatus {
    pub fn new(success_display: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StatusInner {
                state: ExportState::Idle,
                generation: 0,
            })),
            success_display,
        }
    }

    pub fn state(&self) -> ExportState {
        self.inner.lock().state.clone()
    }

    pub fn is_exporting(&self) -> bool {
        self.inner.lock().state == ExportState::Exporting
    }

    pub fn begin(&self) {
        self.set(ExportState::Exporting);
    }

    /// Mark success and schedule the reset to idle. Requires a tokio
    /// runtime.
    pub fn succeed(&self) {
        let generation = self.set(ExportState::Success);
        let inner = self.inner.clone();
        let delay = self.success_display;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut guard = inner.lock();
            // A newer transition owns the state now.
            if guard.generation == generation {
                guard.state = ExportState::Idle;
            }
        });
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.set(ExportState::Error(message.into()));
    }

    pub fn dismiss(&self) {
        self.set(ExportState::Idle);
    }

    fn set(&self, state: ExportState) -> u64 {
        let mut guard = self.inner.lock();
        guard.generation += 1;
        guard.state = state;
        guard.generation
    }
}
