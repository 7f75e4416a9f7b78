//! One-shot shutdown signal plus a completion tracker.
//!
//! [`ShutdownCoordinator`] owns a [`CancellationToken`] broadcast to every
//! waiting point and a [`TaskTracker`] that every worker registers with. Each
//! service instance owns its own coordinator, so instances stop independently.

use core::future::Future;
use tokio_util::{
    sync::{CancellationToken, WaitForCancellationFuture},
    task::TaskTracker,
};

#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    tracker: TaskTracker,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a tracked task. [`stop`](Self::stop) waits for it to finish.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    /// Non-blocking check of the signal.
    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal is closed. Cancel-safe, so it can sit in any
    /// `select!` branch.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Closes the signal without waiting. Only the first call has an effect.
    pub fn signal(&self) {
        self.token.cancel();
        self.tracker.close();
    }

    /// Closes the signal and waits until every tracked task has exited.
    ///
    /// Safe to call repeatedly and concurrently; later calls return as soon
    /// as the tracker is empty.
    pub async fn stop(&self) {
        self.signal();
        self.tracker.wait().await;
    }

    /// Number of tracked tasks still alive.
    pub fn active(&self) -> usize {
        self.tracker.len()
    }
}
