use crate::{
    BoxError, DataSource, Error, JoinReducer, Reducer, RepositoryRecord, RepositorySummary,
    SequenceSource, ServiceConfig, SummaryService,
};
use core::time::Duration;
use futures::future::join_all;
use portable_atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::{sync::Notify, time::timeout};

const BOUND: Duration = Duration::from_secs(10);

/// Wraps a source and records how many fetches overlap.
struct CountingSource<S> {
    inner: S,
    inflight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl<S> CountingSource<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            inflight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl<S: DataSource> DataSource for CountingSource<S> {
    async fn fetch(&self, repo_count: usize) -> Result<Vec<RepositoryRecord>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.inflight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let res = self.inner.fetch(repo_count).await;
        self.inflight.fetch_sub(1, Ordering::SeqCst);
        res
    }
}

/// Fails every odd-sized request.
struct FlakySource;

#[async_trait::async_trait]
impl DataSource for FlakySource {
    async fn fetch(&self, repo_count: usize) -> Result<Vec<RepositoryRecord>, BoxError> {
        if repo_count % 2 == 1 {
            return Err(format!("upstream rejected repoCount={repo_count}").into());
        }
        Ok(SequenceSource::records(repo_count))
    }
}

/// Blocks every fetch until released.
struct GatedSource {
    gate: Arc<Notify>,
}

#[async_trait::async_trait]
impl DataSource for GatedSource {
    async fn fetch(&self, repo_count: usize) -> Result<Vec<RepositoryRecord>, BoxError> {
        self.gate.notified().await;
        Ok(SequenceSource::records(repo_count))
    }
}

/// Keeps its worker busy for a fixed time before joining.
struct SlowReducer {
    delay: Duration,
    inner: JoinReducer,
}

impl Reducer for SlowReducer {
    fn reduce(&self, records: &[RepositoryRecord]) -> RepositorySummary {
        std::thread::sleep(self.delay);
        self.inner.reduce(records)
    }
}

fn service(
    source: Arc<dyn DataSource>,
    max_connections: usize,
    num_workers: usize,
) -> SummaryService {
    let config = ServiceConfig::new(",", max_connections, num_workers).unwrap();
    SummaryService::new(source, config).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_requests_return_expected_summaries() {
    let source = Arc::new(SequenceSource::new(Duration::from_millis(200)));
    let svc = service(source, 50, 4);

    let requests = (0..100).map(|repo_count| {
        let svc = svc.clone();
        tokio::spawn(async move { (repo_count, svc.create_summary(repo_count).await) })
    });
    let results = timeout(BOUND, join_all(requests)).await.expect("no request hung");

    for res in results {
        let (repo_count, summary) = res.unwrap();
        let summary = summary.unwrap();
        assert_eq!(summary, SequenceSource::expected_summary(repo_count, ","));
        if repo_count == 5 {
            assert_eq!(summary.joined_names, "0,1,2,3,4");
            assert_eq!(summary.total_forks, 10);
        }
    }

    let stats = svc.stats();
    assert_eq!(stats.requests, 100);
    assert_eq!(stats.completed, 100);

    svc.stop().await;
    assert_eq!(svc.active_workers(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn zero_repos_yield_empty_summary() {
    let svc = service(Arc::new(SequenceSource::default()), 1, 1);
    let summary = svc.create_summary(0).await.unwrap();
    assert_eq!(summary.joined_names, "");
    assert_eq!(summary.total_forks, 0);
    svc.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn fetch_concurrency_never_exceeds_ceiling() {
    const CEILING: usize = 10;
    let source = Arc::new(CountingSource::new(SequenceSource::new(Duration::from_millis(
        20,
    ))));
    let svc = service(source.clone(), CEILING, 2);

    let requests = (0..100).map(|i| {
        let svc = svc.clone();
        tokio::spawn(async move { svc.create_summary(i % 7).await })
    });
    let results = timeout(BOUND, join_all(requests)).await.expect("no request hung");
    assert!(results.into_iter().all(|r| r.unwrap().is_ok()));

    assert_eq!(source.calls.load(Ordering::SeqCst), 100);
    assert!(source.peak.load(Ordering::SeqCst) <= CEILING);
    let stats = svc.stats();
    assert!(stats.peak_fetches_inflight <= CEILING);
    assert_eq!(stats.fetches_inflight, 0);
    assert_eq!(svc.available_connections(), CEILING);

    svc.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn fetch_error_is_propagated_and_slot_released() {
    let svc = service(Arc::new(FlakySource), 1, 1);

    let err = svc.create_summary(3).await.unwrap_err();
    assert!(err.is_fetch_failed());
    assert_eq!(err.to_string(), "Fetch failed: upstream rejected repoCount=3");

    // The only slot came back, so the next request is not stuck.
    assert_eq!(svc.available_connections(), 1);
    let summary = timeout(BOUND, svc.create_summary(2)).await.unwrap().unwrap();
    assert_eq!(summary.joined_names, "0,1");

    let stats = svc.stats();
    assert_eq!(stats.fetch_failed, 1);
    assert_eq!(stats.completed, 1);
    svc.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn stop_twice_returns_promptly() {
    let svc = service(Arc::new(SequenceSource::default()), 4, 4);
    timeout(BOUND, svc.stop()).await.expect("first stop drained");
    timeout(Duration::from_millis(100), svc.stop())
        .await
        .expect("second stop returned");
    assert!(svc.is_stopped());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn request_after_stop_is_terminated() {
    let svc = service(Arc::new(SequenceSource::default()), 4, 2);
    svc.stop().await;

    let res = timeout(Duration::from_millis(100), svc.create_summary(5))
        .await
        .expect("request did not block");
    assert!(matches!(res, Err(Error::Terminated)));
    assert_eq!(svc.stats().terminated, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn stop_releases_requests_blocked_in_fetch() {
    let gate = Arc::new(Notify::new());
    let svc = service(Arc::new(GatedSource { gate: gate.clone() }), 2, 1);

    // Two requests hold both slots inside the source, the rest wait for one.
    let requests: Vec<_> = (0..6)
        .map(|i| {
            let svc = svc.clone();
            tokio::spawn(async move { svc.create_summary(i).await })
        })
        .collect();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(svc.stats().fetches_inflight, 2);

    timeout(BOUND, svc.stop()).await.expect("stop drained");
    for handle in requests {
        let res = timeout(BOUND, handle).await.expect("request resolved").unwrap();
        assert!(res.unwrap_err().is_terminated());
    }
    assert_eq!(svc.stats().fetches_inflight, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn stop_releases_requests_waiting_on_busy_worker() {
    let reducer = Arc::new(SlowReducer {
        delay: Duration::from_millis(300),
        inner: JoinReducer::new(","),
    });
    let config = ServiceConfig::new(",", 4, 1).unwrap();
    let svc =
        SummaryService::with_reducer(Arc::new(SequenceSource::default()), reducer, config).unwrap();

    // One request is being reduced, one is queued and the rest wait at the
    // hand-off.
    let requests: Vec<_> = (1..=4)
        .map(|i| {
            let svc = svc.clone();
            tokio::spawn(async move { svc.create_summary(i).await })
        })
        .collect();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(svc.stats().finished(), 0);

    timeout(BOUND, svc.stop()).await.expect("stop drained");
    assert_eq!(svc.active_workers(), 0);

    for handle in requests {
        let res = timeout(BOUND, handle).await.expect("request resolved").unwrap();
        assert!(res.unwrap_err().is_terminated());
    }
    assert_eq!(svc.stats().terminated, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn stop_races_in_flight_requests_without_deadlock() {
    let source = Arc::new(SequenceSource::new(Duration::from_millis(20)));
    let svc = service(source, 50, 4);

    let requests: Vec<_> = (0..20)
        .map(|repo_count| {
            let svc = svc.clone();
            tokio::spawn(async move { (repo_count, svc.create_summary(repo_count).await) })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(5)).await;
    timeout(BOUND, svc.stop()).await.expect("stop drained");
    assert_eq!(svc.active_workers(), 0);

    for handle in requests {
        let (repo_count, res) = timeout(BOUND, handle).await.expect("request resolved").unwrap();
        match res {
            Ok(summary) => {
                assert_eq!(summary, SequenceSource::expected_summary(repo_count, ","));
            }
            Err(e) => assert!(e.is_terminated(), "unexpected error: {e}"),
        }
    }

    let stats = svc.stats();
    assert_eq!(stats.finished(), 20);
    assert_eq!(stats.fetch_failed, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn instances_stop_independently() {
    let a = service(Arc::new(SequenceSource::default()), 2, 2);
    let b = service(Arc::new(SequenceSource::default()), 2, 2);

    a.stop().await;
    assert!(a.create_summary(1).await.unwrap_err().is_terminated());

    let summary = b.create_summary(3).await.unwrap();
    assert_eq!(summary.joined_names, "0,1,2");
    assert_eq!(b.active_workers(), 2);
    b.stop().await;
}
