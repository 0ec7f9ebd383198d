//! Shutdown coordination for a run.

use tokio_util::sync::CancellationToken;

/// Coordinator for cancelling an in-flight run.
///
/// Long waits hold a child token and stop when it fires.
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Token for one waiter.
    pub fn token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// Trigger on SIGINT/SIGTERM.
    pub fn listen_for_signals(&self) -> tokio::task::JoinHandle<()> {
        crate::lifecycle::signals::spawn_signal_listener(self.token.clone())
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
