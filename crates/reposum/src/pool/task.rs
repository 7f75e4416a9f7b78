use crate::{RepositoryRecord, RepositorySummary};
use tokio::sync::oneshot;

/// Work handed from a request to exactly one worker.
///
/// The result slot is a capacity-one channel: the worker writes once without
/// waiting for a reader, so an abandoned task never blocks a worker.
#[derive(Debug)]
pub struct SummaryTask {
    pub records: Vec<RepositoryRecord>,
    pub result: oneshot::Sender<RepositorySummary>,
}

impl SummaryTask {
    /// Creates a task and the receiving end of its result slot.
    pub fn new(records: Vec<RepositoryRecord>) -> (Self, oneshot::Receiver<RepositorySummary>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                records,
                result: tx,
            },
            rx,
        )
    }
}
