//! Admission control for outbound fetches.
//!
//! [`ConnectionLimiter`] is a counting semaphore sized to the connection
//! ceiling. Each fetch holds one [`ConnectionSlot`] for its whole duration and
//! the slot returns to the pool when dropped, so every exit path releases it.
//!
//! Closing the limiter rejects all current and future acquisitions. The
//! service closes it on shutdown so no request waiting for a slot outlives
//! the signal.

use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds the number of concurrent fetches.
#[derive(Debug, Clone)]
pub struct ConnectionLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConnectionLimiter {
    /// Creates a limiter with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits until a slot is free and takes ownership of it.
    ///
    /// Waiters are served in roughly FIFO order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Terminated`] if the limiter is closed, either before
    /// the call or while waiting.
    pub async fn acquire(&self) -> Result<ConnectionSlot> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| Error::Terminated)?;
        Ok(ConnectionSlot { _permit: permit })
    }

    /// Rejects every pending and future [`acquire`](Self::acquire). Slots
    /// already handed out stay valid until dropped. Idempotent.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Configured ceiling.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently held.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// One unit of fetch capacity. Returned to the limiter on drop.
#[derive(Debug)]
#[must_use = "the slot is released as soon as it is dropped"]
pub struct ConnectionSlot {
    _permit: OwnedSemaphorePermit,
}

impl ConnectionSlot {
    /// Returns the slot to the limiter now.
    pub fn release(self) {}
}
