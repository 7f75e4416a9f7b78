//! Asynchronous worker pool for summary reduction.
//!
//! This module defines the [`WorkerPool`] struct, which spawns a fixed number
//! of workers at construction and feeds them [`SummaryTask`]s through a shared
//! queue. The queue holds at most one task, so a request that finishes its
//! fetch while every worker is busy waits at the hand-off rather than piling
//! up in a buffer.
//!
//! Workers register with the pool's [`ShutdownCoordinator`], which lets
//! [`WorkerPool::shutdown`] confirm that every one of them has exited.

use crate::{
    Error, Result, ShutdownCoordinator,
    pool::{task::SummaryTask, worker::worker_loop},
    reduce::Reducer,
};
use async_channel::{Receiver, Sender};
use std::sync::Arc;

/// Capacity of the task queue between requests and workers.
const TASK_QUEUE_CAPACITY: usize = 1;

/// A fixed set of workers draining one shared task queue.
#[derive(Debug)]
pub struct WorkerPool {
    tasks: Sender<SummaryTask>,
    queued: Receiver<SummaryTask>,
    shutdown: ShutdownCoordinator,
    num_workers: usize,
}

impl WorkerPool {
    /// Spawns `num_workers` workers sharing `reducer`.
    ///
    /// The worker count never changes afterwards. Must be called from within
    /// a Tokio runtime.
    pub fn spawn(
        num_workers: usize,
        reducer: Arc<dyn Reducer>,
        shutdown: ShutdownCoordinator,
    ) -> Self {
        let (tx, rx) = async_channel::bounded(TASK_QUEUE_CAPACITY);

        for worker_id in 0..num_workers {
            shutdown.spawn(worker_loop(
                worker_id,
                rx.clone(),
                Arc::clone(&reducer),
                shutdown.clone(),
            ));
        }

        Self {
            tasks: tx,
            queued: rx,
            shutdown,
            num_workers,
        }
    }

    /// Hands a task to the next free worker, waiting while all are busy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Terminated`] if shutdown was signalled before the
    /// task was accepted. The task is dropped in that case.
    pub async fn enqueue(&self, task: SummaryTask) -> Result<()> {
        if self.shutdown.is_shutdown() {
            return Err(Error::Terminated);
        }

        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => Err(Error::Terminated),
            sent = self.tasks.send(task) => sent.map_err(|_| Error::Terminated),
        }
    }

    /// Closes the queue and waits for every worker to exit.
    ///
    /// Tasks still queued are dropped, which resolves their result slots as
    /// abandoned.
    pub async fn shutdown(&self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Stopping worker pool ({} workers alive)",
            self.shutdown.active()
        );

        self.shutdown.signal();
        self.tasks.close();
        self.shutdown.stop().await;

        // Closing keeps buffered tasks alive; nobody will take them now.
        while self.queued.try_recv().is_ok() {}

        #[cfg(feature = "tracing")]
        tracing::debug!("Worker pool shutdown complete");
    }

    pub const fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Workers that have not exited yet.
    pub fn active_workers(&self) -> usize {
        self.shutdown.active()
    }
}
