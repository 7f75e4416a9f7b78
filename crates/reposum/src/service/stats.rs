//! Request counters for a running service.
//!
//! Counters are updated with relaxed atomics on the request path and read as
//! a point-in-time [`StatsSnapshot`]. Individual fields of a snapshot are
//! exact; the snapshot as a whole is not taken atomically.

use portable_atomic::{AtomicUsize, Ordering};
use serde::Serialize;

#[derive(Debug, Default)]
pub struct ServiceStats {
    requests: AtomicUsize,
    completed: AtomicUsize,
    terminated: AtomicUsize,
    fetch_failed: AtomicUsize,
    fetches_inflight: AtomicUsize,
    peak_fetches_inflight: AtomicUsize,
}

/// Copy of the counters at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Calls to `create_summary`, including rejected ones.
    pub requests: usize,
    /// Requests that returned a summary.
    pub completed: usize,
    /// Requests that returned `Terminated`.
    pub terminated: usize,
    /// Requests whose fetch failed.
    pub fetch_failed: usize,
    /// Fetches running right now.
    pub fetches_inflight: usize,
    /// Highest number of fetches ever running at once.
    pub peak_fetches_inflight: usize,
}

impl StatsSnapshot {
    /// Requests that reached a terminal state.
    pub const fn finished(&self) -> usize {
        self.completed + self.terminated + self.fetch_failed
    }
}

impl ServiceStats {
    pub fn increment_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_terminated(&self) {
        self.terminated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fetch_failed(&self) {
        self.fetch_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Marks a fetch as started. The returned guard marks it finished when
    /// dropped.
    pub fn fetch_started(&self) -> FetchGuard<'_> {
        let now = self.fetches_inflight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_fetches_inflight.fetch_max(now, Ordering::AcqRel);
        FetchGuard { stats: self }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            terminated: self.terminated.load(Ordering::Relaxed),
            fetch_failed: self.fetch_failed.load(Ordering::Relaxed),
            fetches_inflight: self.fetches_inflight.load(Ordering::Acquire),
            peak_fetches_inflight: self.peak_fetches_inflight.load(Ordering::Acquire),
        }
    }
}

/// Decrements the in-flight fetch gauge on drop.
#[derive(Debug)]
pub struct FetchGuard<'a> {
    stats: &'a ServiceStats,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.stats.fetches_inflight.fetch_sub(1, Ordering::AcqRel);
    }
}
