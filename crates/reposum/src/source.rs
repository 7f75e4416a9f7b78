//! The external fetch capability consumed by the service.
//!
//! A [`DataSource`] performs one fetch for a requested number of repositories.
//! The service never retries; any error is terminal for that request and is
//! handed back to the caller unchanged.

use crate::{BoxError, JoinReducer, Reducer, RepositoryRecord, RepositorySummary};
use core::time::Duration;
use rand::Rng;

/// Fetches repository records.
///
/// Implementations must tolerate concurrent calls up to the service's
/// connection ceiling.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// Fetches up to `repo_count` records, in the order the source reports
    /// them.
    async fn fetch(&self, repo_count: usize) -> Result<Vec<RepositoryRecord>, BoxError>;
}

/// Deterministic in-memory source emulating network latency.
///
/// A fetch of `n` returns records named `"0"` to `"n-1"` where record `i`
/// has `i` forks, after sleeping for a uniformly random duration in
/// `[0, max_delay]`.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    max_delay: Duration,
}

impl SequenceSource {
    pub const fn new(max_delay: Duration) -> Self {
        Self { max_delay }
    }

    /// Records this source returns for `repo_count`, without the delay.
    pub fn records(repo_count: usize) -> Vec<RepositoryRecord> {
        (0..repo_count)
            .map(|i| RepositoryRecord::new(i.to_string(), i as u64))
            .collect()
    }

    /// The summary a [`JoinReducer`] with `separator` produces for
    /// `repo_count`.
    pub fn expected_summary(repo_count: usize, separator: &str) -> RepositorySummary {
        JoinReducer::new(separator).reduce(&Self::records(repo_count))
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_delay.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}

#[async_trait::async_trait]
impl DataSource for SequenceSource {
    async fn fetch(&self, repo_count: usize) -> Result<Vec<RepositoryRecord>, BoxError> {
        let delay = self.jitter();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(Self::records(repo_count))
    }
}
