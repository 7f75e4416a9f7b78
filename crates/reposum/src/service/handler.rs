//! Request orchestration for repository summaries.
//!
//! This module defines [`SummaryService`], the public entry point. Each call
//! to [`SummaryService::create_summary`] moves through
//!
//! `AwaitingSlot -> Fetching -> Enqueued -> AwaitingResult`
//!
//! and ends in exactly one of: a summary, [`Error::FetchFailed`], or
//! [`Error::Terminated`]. There are no retries.
//!
//! ## Backpressure
//!
//! - The [`ConnectionLimiter`] bounds how many fetches run at once.
//! - The [`WorkerPool`] bounds how many reductions run at once. A fetched
//!   request waits at the queue hand-off until a worker is free.
//!
//! ## Shutdown
//!
//! Every wait above races the shutdown signal, so once
//! [`SummaryService::stop`] begins, all pending requests resolve promptly.

use crate::{
    ConnectionLimiter, DataSource, Error, JoinReducer, RepositoryRecord, RepositorySummary,
    Result, ShutdownCoordinator,
    pool::{manager::WorkerPool, task::SummaryTask},
    reduce::Reducer,
    service::{
        config::ServiceConfig,
        stats::{ServiceStats, StatsSnapshot},
    },
};
use std::sync::Arc;

/// Bounded-concurrency orchestrator turning repository counts into
/// summaries.
///
/// Cloning is cheap and every clone drives the same limiter, pool and
/// shutdown signal.
#[derive(Clone)]
pub struct SummaryService {
    config: ServiceConfig,
    source: Arc<dyn DataSource>,
    limiter: ConnectionLimiter,
    worker_pool: Arc<WorkerPool>,
    shutdown: ShutdownCoordinator,
    stats: Arc<ServiceStats>,
}

impl SummaryService {
    /// Creates a service that joins names with `config.separator`, and spawns
    /// its workers.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails validation.
    pub fn new(source: Arc<dyn DataSource>, config: ServiceConfig) -> Result<Self> {
        let reducer = Arc::new(JoinReducer::new(config.separator.clone()));
        Self::with_reducer(source, reducer, config)
    }

    /// Like [`new`](Self::new), with a custom reduction rule.
    /// `config.separator` is ignored by anything but the default reducer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails validation.
    pub fn with_reducer(
        source: Arc<dyn DataSource>,
        reducer: Arc<dyn Reducer>,
        config: ServiceConfig,
    ) -> Result<Self> {
        config.validate()?;

        let shutdown = ShutdownCoordinator::new();
        let limiter = ConnectionLimiter::new(config.max_connections);
        let worker_pool = WorkerPool::spawn(config.num_workers, reducer, shutdown.clone());

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Summary service started with {} connections and {} workers",
            config.max_connections,
            config.num_workers
        );

        Ok(Self {
            config,
            source,
            limiter,
            worker_pool: Arc::new(worker_pool),
            shutdown,
            stats: Arc::new(ServiceStats::default()),
        })
    }

    /// Fetches `repo_count` repositories and returns their summary.
    ///
    /// # Errors
    ///
    /// - [`Error::Terminated`] if the service is stopped, or stops before a
    ///   summary is delivered.
    /// - [`Error::FetchFailed`] if the data source fails. The connection slot
    ///   is released before returning.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn create_summary(&self, repo_count: usize) -> Result<RepositorySummary> {
        self.stats.increment_requests();

        let res = self.run(repo_count).await;
        match &res {
            Ok(_) => self.stats.increment_completed(),
            Err(Error::FetchFailed(_e)) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Fetching {repo_count} repos failed: {_e}");
                self.stats.increment_fetch_failed();
            }
            Err(_) => self.stats.increment_terminated(),
        }
        res
    }

    async fn run(&self, repo_count: usize) -> Result<RepositorySummary> {
        if self.shutdown.is_shutdown() {
            return Err(Error::Terminated);
        }

        let records = self.fetch(repo_count).await?;

        let (task, result) = SummaryTask::new(records);
        self.worker_pool.enqueue(task).await?;

        // A delivered summary wins over a concurrent shutdown.
        tokio::select! {
            biased;
            summary = result => summary.map_err(|_| Error::Terminated),
            () = self.shutdown.cancelled() => Err(Error::Terminated),
        }
    }

    /// Runs one fetch while holding a connection slot.
    async fn fetch(&self, repo_count: usize) -> Result<Vec<RepositoryRecord>> {
        let slot = tokio::select! {
            biased;
            () = self.shutdown.cancelled() => return Err(Error::Terminated),
            slot = self.limiter.acquire() => slot?,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("Requesting data for {repo_count} repos");

        let fetched = {
            let _inflight = self.stats.fetch_started();
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => Err(Error::Terminated),
                fetched = self.source.fetch(repo_count) => fetched.map_err(Error::FetchFailed),
            }
        };
        slot.release();

        #[cfg(feature = "tracing")]
        {
            if let Ok(records) = &fetched {
                tracing::debug!(
                    "Data for {repo_count} repos received ({} records)",
                    records.len()
                );
            }
        }

        fetched
    }

    /// Stops accepting requests and waits until every worker has exited.
    ///
    /// Requests still in progress resolve to [`Error::Terminated`]. Calling
    /// this more than once, or from several tasks at once, is safe.
    pub async fn stop(&self) {
        #[cfg(feature = "tracing")]
        tracing::info!("Terminating summary service");

        self.limiter.close();
        self.worker_pool.shutdown().await;

        #[cfg(feature = "tracing")]
        tracing::info!("Summary service terminated");
    }

    /// Returns `true` once [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_shutdown()
    }

    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Current request counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Workers that have not exited yet. Zero after [`stop`](Self::stop)
    /// returns.
    pub fn active_workers(&self) -> usize {
        self.worker_pool.active_workers()
    }

    /// Free connection slots.
    pub fn available_connections(&self) -> usize {
        self.limiter.available()
    }
}

impl core::fmt::Debug for SummaryService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SummaryService")
            .field("config", &self.config)
            .field("worker_pool", &self.worker_pool)
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}
