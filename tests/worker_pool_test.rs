//! Worker pool tests - retry/backoff behavior end to end
//!
//! A processor that always throws a transient error is attempted exactly
//! max_attempts times with non-decreasing delays and ends failed with the
//! last error recorded; the exhausted hook fires once.

use async_trait::async_trait;
use backline::modules::jobs::domain::entities::{
    CatalogSyncPayload, Job, JobPriority, JobRecord, Queue,
};
use backline::modules::jobs::domain::repository::{EnqueueOptions, JobStore};
use backline::modules::jobs::infrastructure::memory::{MemoryJobStore, RetentionConfig};
use backline::modules::jobs::worker::{JobProcessor, WorkerPool};
use backline::shared::config::{QueueConfig, RetryConfig};
use backline::shared::errors::{AppError, AppResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

struct AlwaysFailing {
    attempts: Mutex<Vec<Instant>>,
    exhausted: AtomicUsize,
}

impl AlwaysFailing {
    fn new() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            exhausted: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl JobProcessor for AlwaysFailing {
    async fn process(&self, _job: &JobRecord) -> AppResult<()> {
        self.attempts.lock().unwrap().push(Instant::now());
        Err(AppError::ProviderTransient("provider down".to_string()))
    }

    async fn on_exhausted(&self, _job: &JobRecord, _error: &AppError) {
        self.exhausted.fetch_add(1, Ordering::SeqCst);
    }
}

struct FailOnce {
    calls: AtomicUsize,
}

#[async_trait]
impl JobProcessor for FailOnce {
    async fn process(&self, _job: &JobRecord) -> AppResult<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(AppError::ProviderTransient("flaky".to_string()))
        } else {
            Ok(())
        }
    }
}

fn store_with(max_attempts: i32, base_ms: u64) -> Arc<dyn JobStore> {
    Arc::new(MemoryJobStore::new(
        RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_secs(2),
        },
        RetentionConfig::default(),
    ))
}

fn fast_queue(concurrency: usize) -> QueueConfig {
    QueueConfig {
        concurrency,
        poll_interval: Duration::from_millis(10),
        lease_duration: Duration::from_secs(10),
        throughput: None,
    }
}

async fn wait_until<F>(mut predicate: F, timeout: Duration)
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    while !predicate() {
        assert!(Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn transient_failures_retry_until_exhausted() {
    let store = store_with(3, 50);
    let processor = Arc::new(AlwaysFailing::new());
    let pool = Arc::new(WorkerPool::new(
        Queue::CatalogSync,
        Arc::clone(&store),
        Arc::clone(&processor) as Arc<dyn JobProcessor>,
        fast_queue(1),
    ));

    let enqueued = store
        .enqueue(
            Job::catalog_sync(
                CatalogSyncPayload {
                    artist_id: Uuid::new_v4(),
                    deep: false,
                },
                JobPriority::Normal,
            ),
            EnqueueOptions::default(),
        )
        .await
        .unwrap();

    Arc::clone(&pool).start().await;
    wait_until(
        || processor.exhausted.load(Ordering::SeqCst) == 1,
        Duration::from_secs(5),
    )
    .await;
    pool.shutdown().await;

    let attempts = processor.attempts.lock().unwrap().clone();
    assert_eq!(attempts.len(), 3, "attempted exactly max_attempts times");

    // Backoff doubles: the second gap must not be shorter than the first
    // (modulo the worker poll granularity)
    let gap1 = attempts[1] - attempts[0];
    let gap2 = attempts[2] - attempts[1];
    assert!(
        gap2 + Duration::from_millis(15) >= gap1,
        "delays should be non-decreasing: {:?} then {:?}",
        gap1,
        gap2
    );

    let record = store.get_by_id(enqueued.id).await.unwrap().unwrap();
    assert_eq!(record.state, "failed");
    assert_eq!(record.attempts, 3);
    assert_eq!(record.error.as_deref(), Some("Provider transient error: provider down"));
}

#[tokio::test]
async fn non_retryable_error_fails_on_first_attempt() {
    let store = store_with(3, 20);

    struct Invalid;
    #[async_trait]
    impl JobProcessor for Invalid {
        async fn process(&self, _job: &JobRecord) -> AppResult<()> {
            Err(AppError::ValidationError("malformed".to_string()))
        }
    }

    let pool = Arc::new(WorkerPool::new(
        Queue::CatalogSync,
        Arc::clone(&store),
        Arc::new(Invalid) as Arc<dyn JobProcessor>,
        fast_queue(1),
    ));

    let enqueued = store
        .enqueue(
            Job::catalog_sync(
                CatalogSyncPayload {
                    artist_id: Uuid::new_v4(),
                    deep: false,
                },
                JobPriority::Normal,
            ),
            EnqueueOptions::default(),
        )
        .await
        .unwrap();

    Arc::clone(&pool).start().await;
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let record = store.get_by_id(enqueued.id).await.unwrap().unwrap();
        if record.state == "failed" {
            break;
        }
        assert!(Instant::now() < deadline, "job did not fail in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    pool.shutdown().await;

    let record = store.get_by_id(enqueued.id).await.unwrap().unwrap();
    assert_eq!(record.attempts, 1);
}

#[tokio::test]
async fn flaky_job_recovers_on_retry() {
    let store = store_with(3, 20);
    let processor = Arc::new(FailOnce {
        calls: AtomicUsize::new(0),
    });
    let pool = Arc::new(WorkerPool::new(
        Queue::CatalogSync,
        Arc::clone(&store),
        Arc::clone(&processor) as Arc<dyn JobProcessor>,
        fast_queue(1),
    ));

    let enqueued = store
        .enqueue(
            Job::catalog_sync(
                CatalogSyncPayload {
                    artist_id: Uuid::new_v4(),
                    deep: false,
                },
                JobPriority::Normal,
            ),
            EnqueueOptions::default(),
        )
        .await
        .unwrap();

    Arc::clone(&pool).start().await;
    wait_until(
        || processor.calls.load(Ordering::SeqCst) >= 2,
        Duration::from_secs(5),
    )
    .await;
    // Give the ack a moment to land
    tokio::time::sleep(Duration::from_millis(50)).await;
    pool.shutdown().await;

    let record = store.get_by_id(enqueued.id).await.unwrap().unwrap();
    assert_eq!(record.state, "completed");
    assert_eq!(record.attempts, 2);
}

#[tokio::test]
async fn concurrency_is_bounded_by_the_pool() {
    let store = store_with(1, 20);

    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
        done: AtomicUsize,
    }
    #[async_trait]
    impl JobProcessor for Gauge {
        async fn process(&self, _job: &JobRecord) -> AppResult<()> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            self.done.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    let gauge = Arc::new(Gauge {
        current: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
        done: AtomicUsize::new(0),
    });
    let pool = Arc::new(WorkerPool::new(
        Queue::CatalogSync,
        Arc::clone(&store),
        Arc::clone(&gauge) as Arc<dyn JobProcessor>,
        fast_queue(2),
    ));

    for _ in 0..6 {
        store
            .enqueue(
                Job::catalog_sync(
                    CatalogSyncPayload {
                        artist_id: Uuid::new_v4(),
                        deep: false,
                    },
                    JobPriority::Normal,
                ),
                EnqueueOptions::default(),
            )
            .await
            .unwrap();
    }

    Arc::clone(&pool).start().await;
    wait_until(
        || gauge.done.load(Ordering::SeqCst) == 6,
        Duration::from_secs(5),
    )
    .await;
    pool.shutdown().await;

    assert!(gauge.peak.load(Ordering::SeqCst) <= 2);
}
