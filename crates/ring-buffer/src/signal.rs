//! Binary signal (counts to one)

use std::time::Duration;
use tokio::sync::Notify;

/// One-shot notification holding at most one pending occurrence
///
/// Raising an already-pending signal coalesces into the existing one.
#[derive(Debug, Default)]
pub struct BinarySignal {
    notify: Notify,
}

impl BinarySignal {
    /// Create a signal with nothing pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal; never waits
    pub fn raise(&self) {
        self.notify.notify_one();
    }

    /// Wait until the signal is raised, consuming it
    pub async fn wait(&self) {
        self.notify.notified().await;
    }

    /// Wait up to `timeout`; returns whether the signal was taken
    pub async fn wait_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait()).await.is_ok()
    }
}
