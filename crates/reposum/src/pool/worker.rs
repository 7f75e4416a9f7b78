use crate::{ShutdownCoordinator, pool::task::SummaryTask, reduce::Reducer};
use async_channel::Receiver;
use std::sync::Arc;

/// Worker task that reduces [`SummaryTask`]s until shutdown.
///
/// Every worker shares one queue receiver; each task is received by exactly
/// one worker. The loop ends when the shutdown signal closes or the queue is
/// closed and empty.
///
/// # Arguments
///
/// - `worker_id`: Index of this worker (used for logs/tracing).
/// - `tasks`: Shared receiving end of the task queue.
/// - `reducer`: Business rule applied to each task's records.
/// - `shutdown`: Signal raced against every wait for the next task.
///
/// # Behavior
///
/// - Shutdown wins over a ready task, so no new reduction starts once the
///   signal is observed.
/// - A result whose submitter already gave up is dropped; the write never
///   blocks.
pub async fn worker_loop(
    worker_id: usize,
    tasks: Receiver<SummaryTask>,
    reducer: Arc<dyn Reducer>,
    shutdown: ShutdownCoordinator,
) {
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");

    loop {
        let task = tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Worker {worker_id} received shutdown signal");
                break;
            }
            task = tasks.recv() => match task {
                Ok(task) => task,
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Worker {worker_id} queue closed");
                    break;
                }
            },
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Worker {worker_id} creating summary of {} repos",
            task.records.len()
        );

        let summary = reducer.reduce(&task.records);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Worker {worker_id} finished summary of {} repos",
            task.records.len()
        );

        if task.result.send(summary).is_err() {
            #[cfg(feature = "tracing")]
            tracing::debug!("Worker {worker_id} dropped summary, submitter is gone");
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} stopped");

    #[cfg(not(feature = "tracing"))]
    let _ = worker_id;
}
