/// Worker pools for processing queued import jobs
///
/// One pool per named queue runs a bounded number of concurrent workers.
/// Each worker leases exactly one job at a time, invokes the registered
/// processor, and acks or marks it for retry. Workers block only on the
/// optional queue throttle and on polling an empty queue.
use crate::modules::jobs::domain::entities::{JobRecord, JobState, Queue};
use crate::modules::jobs::domain::repository::JobStore;
use crate::shared::config::QueueConfig;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::rate_limiter::ProviderRateLimiter;
use crate::{log_debug, log_error, log_info, log_warn};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Processor registered for one queue
#[async_trait]
pub trait JobProcessor: Send + Sync {
    /// Execute the leased job. A returned error marks the job for retry (or
    /// permanent failure) according to `AppError::is_retryable`.
    async fn process(&self, job: &JobRecord) -> AppResult<()>;

    /// Invoked once when a job exhausts its attempts and is failed
    /// permanently. Stage processors mark their import status failed here.
    async fn on_exhausted(&self, _job: &JobRecord, _error: &AppError) {}
}

/// Worker pool for one named queue
pub struct WorkerPool {
    queue: Queue,
    store: Arc<dyn JobStore>,
    processor: Arc<dyn JobProcessor>,
    config: QueueConfig,
    /// Queue-wide throughput cap shared by all workers of this pool,
    /// distinct from the per-provider limiters inside adapters.
    throttle: Option<Arc<ProviderRateLimiter>>,
    shutdown: CancellationToken,
    handles: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(
        queue: Queue,
        store: Arc<dyn JobStore>,
        processor: Arc<dyn JobProcessor>,
        config: QueueConfig,
    ) -> Self {
        let throttle = config.throughput.map(|(permits, period)| {
            Arc::new(ProviderRateLimiter::new(
                &format!("queue:{}", queue),
                permits,
                period,
                permits.max(1),
            ))
        });

        Self {
            queue,
            store,
            processor,
            config,
            throttle,
            shutdown: CancellationToken::new(),
            handles: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn queue(&self) -> Queue {
        self.queue
    }

    /// Spawn the pool's workers.
    pub async fn start(self: Arc<Self>) {
        let mut handles = self.handles.lock().await;
        if !handles.is_empty() {
            log_warn!("Worker pool for {} already started", self.queue);
            return;
        }

        for n in 0..self.config.concurrency {
            let pool = Arc::clone(&self);
            let worker_id = format!("{}-{}", self.queue, n);
            handles.push(tokio::spawn(async move {
                pool.worker_loop(worker_id).await;
            }));
        }

        log_info!(
            "Worker pool for {} started ({} workers)",
            self.queue,
            self.config.concurrency
        );
    }

    /// Request shutdown and wait for all workers to finish their current job.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let mut handles = self.handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                log_error!("Worker task for {} panicked: {}", self.queue, e);
            }
        }
        log_info!("Worker pool for {} stopped", self.queue);
    }

    async fn worker_loop(self: Arc<Self>, worker_id: String) {
        log_debug!("Worker {} started", worker_id);

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            // Queue-level throughput cap applies before taking a job
            if let Some(throttle) = &self.throttle {
                tokio::select! {
                    _ = throttle.wait() => {}
                    _ = self.shutdown.cancelled() => break,
                }
            }

            match self
                .store
                .dequeue(self.queue, &worker_id, self.config.lease_duration)
                .await
            {
                Ok(Some(job)) => {
                    self.run_job(&worker_id, job).await;
                    // Job processed, immediately try for the next one
                }
                Ok(None) => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                        _ = self.shutdown.cancelled() => break,
                    }
                }
                Err(e) => {
                    log_error!("Worker {} failed to dequeue: {}", worker_id, e);
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                        _ = self.shutdown.cancelled() => break,
                    }
                }
            }
        }

        log_debug!("Worker {} stopped", worker_id);
    }

    async fn run_job(&self, worker_id: &str, job: JobRecord) {
        log_info!(
            "Worker {} processing job {} (attempt {}/{})",
            worker_id,
            job.id,
            job.attempts,
            job.max_attempts
        );

        match self.processor.process(&job).await {
            Ok(()) => {
                if let Err(e) = self.store.mark_completed(job.id).await {
                    log_error!("Failed to ack job {}: {}", job.id, e);
                } else {
                    log_info!("Job {} completed", job.id);
                }
            }
            Err(e) => {
                let error_msg = e.to_string();
                log_warn!("Job {} failed: {}", job.id, error_msg);

                match self
                    .store
                    .mark_failed(job.id, &error_msg, e.is_retryable())
                    .await
                {
                    Ok(updated) => {
                        if updated.parse_state() == Ok(JobState::Failed) {
                            log_error!(
                                "Job {} failed permanently after {} attempts",
                                job.id,
                                updated.attempts
                            );
                            self.processor.on_exhausted(&updated, &e).await;
                        } else {
                            log_info!(
                                "Job {} scheduled for retry (attempt {}/{})",
                                job.id,
                                updated.attempts,
                                updated.max_attempts
                            );
                        }
                    }
                    Err(store_err) => {
                        log_error!("Failed to mark job {} failed: {}", job.id, store_err);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::jobs::domain::entities::{CatalogSyncPayload, Job, JobPriority};
    use crate::modules::jobs::domain::repository::EnqueueOptions;
    use crate::modules::jobs::infrastructure::MemoryJobStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    struct CountingProcessor {
        processed: AtomicUsize,
    }

    #[async_trait]
    impl JobProcessor for CountingProcessor {
        async fn process(&self, _job: &JobRecord) -> AppResult<()> {
            self.processed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn pool_processes_enqueued_jobs() {
        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::default());
        let processor = Arc::new(CountingProcessor {
            processed: AtomicUsize::new(0),
        });

        let pool = Arc::new(WorkerPool::new(
            Queue::CatalogSync,
            Arc::clone(&store),
            Arc::clone(&processor) as Arc<dyn JobProcessor>,
            QueueConfig {
                concurrency: 2,
                poll_interval: Duration::from_millis(10),
                ..QueueConfig::default()
            },
        ));

        for _ in 0..3 {
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

        for _ in 0..50 {
            if processor.processed.load(Ordering::SeqCst) == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        pool.shutdown().await;

        assert_eq!(processor.processed.load(Ordering::SeqCst), 3);
        let counts = store.counts(Queue::CatalogSync).await.unwrap();
        assert_eq!(counts.completed, 3);
    }
}
