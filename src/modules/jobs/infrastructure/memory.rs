/// In-process implementation of the job store
///
/// One mutex over the job table; dequeue assigns the lease under that lock,
/// so no two workers ever hold the same job (the in-process equivalent of
/// `FOR UPDATE SKIP LOCKED`). Suitable for a single-process deployment and
/// for the test suite; a SQL-backed store plugs in behind the same trait.
use crate::modules::jobs::domain::entities::{Job, JobRecord, JobState, Queue};
use crate::modules::jobs::domain::repository::{EnqueueOptions, JobStore, QueueCounts};
use crate::shared::config::RetryConfig;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

/// Retention windows for finished jobs
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    pub completed: Duration,
    pub failed: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            completed: Duration::from_secs(60 * 60),
            failed: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredJob {
    id: Uuid,
    queue: Queue,
    payload: serde_json::Value,
    priority: i32,
    state: JobState,
    attempts: i32,
    max_attempts: i32,
    progress: i32,
    delay_until: Option<DateTime<Utc>>,
    lease_owner: Option<String>,
    lease_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    error: Option<String>,
    /// Monotonic enqueue sequence, FIFO tiebreak within a priority.
    seq: u64,
}

impl StoredJob {
    fn to_record(&self) -> JobRecord {
        JobRecord {
            id: self.id,
            queue: self.queue.to_string(),
            payload: self.payload.clone(),
            priority: self.priority,
            state: self.state.to_string(),
            attempts: self.attempts,
            max_attempts: self.max_attempts,
            progress: self.progress,
            delay_until: self.delay_until,
            lease_owner: self.lease_owner.clone(),
            lease_expires_at: self.lease_expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            error: self.error.clone(),
        }
    }

    /// When this job becomes (or became) eligible for dequeue, or None if it
    /// is not in a dequeueable state.
    fn eligible_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.state {
            JobState::Waiting => Some(self.created_at),
            JobState::Delayed => self.delay_until.filter(|due| *due <= now),
            // A leased job whose lease expired is up for grabs again
            JobState::Active => self.lease_expires_at.filter(|exp| *exp <= now),
            JobState::Completed | JobState::Failed => None,
        }
    }
}

struct StoreInner {
    jobs: HashMap<Uuid, StoredJob>,
    next_seq: u64,
}

pub struct MemoryJobStore {
    retry: RetryConfig,
    retention: RetentionConfig,
    inner: Mutex<StoreInner>,
}

impl MemoryJobStore {
    pub fn new(retry: RetryConfig, retention: RetentionConfig) -> Self {
        Self {
            retry,
            retention,
            inner: Mutex::new(StoreInner {
                jobs: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Exponential backoff with a small jitter, capped at the configured max.
    fn backoff_delay(&self, attempt: i32) -> Duration {
        let exponent = attempt.saturating_sub(1).clamp(0, 16) as u32;
        let base = self
            .retry
            .base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.retry.max_delay);
        let jitter = rand::thread_rng().gen_range(0.0..0.1);
        base.mul_f64(1.0 + jitter).min(self.retry.max_delay)
    }
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new(RetryConfig::default(), RetentionConfig::default())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn enqueue(&self, job: Job, opts: EnqueueOptions) -> AppResult<JobRecord> {
        let now = Utc::now();
        let delay_until = opts
            .delay
            .map(|d| {
                ChronoDuration::from_std(d)
                    .map(|d| now + d)
                    .map_err(|e| AppError::ValidationError(format!("invalid delay: {}", e)))
            })
            .transpose()?;

        let mut inner = self.inner.lock().unwrap();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let stored = StoredJob {
            id: Uuid::new_v4(),
            queue: job.queue,
            payload: job.payload,
            priority: opts.priority.unwrap_or(job.priority).as_i32(),
            state: if delay_until.is_some() {
                JobState::Delayed
            } else {
                JobState::Waiting
            },
            attempts: 0,
            max_attempts: self.retry.max_attempts,
            progress: 0,
            delay_until,
            lease_owner: None,
            lease_expires_at: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            error: None,
            seq,
        };

        let record = stored.to_record();
        inner.jobs.insert(stored.id, stored);
        Ok(record)
    }

    async fn dequeue(
        &self,
        queue: Queue,
        worker_id: &str,
        lease: Duration,
    ) -> AppResult<Option<JobRecord>> {
        let now = Utc::now();
        let lease = ChronoDuration::from_std(lease)
            .map_err(|e| AppError::ValidationError(format!("invalid lease: {}", e)))?;

        let mut inner = self.inner.lock().unwrap();

        let candidate = inner
            .jobs
            .values()
            .filter(|j| j.queue == queue)
            .filter_map(|j| j.eligible_at(now).map(|at| (j.priority, at, j.seq, j.id)))
            .min();

        let Some((_, _, _, id)) = candidate else {
            return Ok(None);
        };

        let job = inner.jobs.get_mut(&id).expect("candidate id present");
        job.state = JobState::Active;
        job.attempts += 1;
        job.lease_owner = Some(worker_id.to_string());
        job.lease_expires_at = Some(now + lease);
        job.updated_at = now;

        Ok(Some(job.to_record()))
    }

    async fn mark_completed(&self, job_id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let job = inner
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::StoreError(format!("job {} not found", job_id)))?;

        let now = Utc::now();
        job.state = JobState::Completed;
        job.progress = 100;
        job.lease_owner = None;
        job.lease_expires_at = None;
        job.completed_at = Some(now);
        job.updated_at = now;
        Ok(())
    }

    async fn mark_failed(
        &self,
        job_id: Uuid,
        error: &str,
        retryable: bool,
    ) -> AppResult<JobRecord> {
        let mut inner = self.inner.lock().unwrap();
        let job = inner
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::StoreError(format!("job {} not found", job_id)))?;

        let now = Utc::now();
        job.error = Some(error.to_string());
        job.lease_owner = None;
        job.lease_expires_at = None;
        job.updated_at = now;

        if retryable && job.attempts < job.max_attempts {
            let delay = self.backoff_delay(job.attempts);
            job.state = JobState::Delayed;
            job.delay_until = ChronoDuration::from_std(delay).ok().map(|d| now + d);
        } else {
            job.state = JobState::Failed;
            job.completed_at = Some(now);
        }

        Ok(job.to_record())
    }

    async fn update_progress(&self, job_id: Uuid, percent: i32) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let job = inner
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::StoreError(format!("job {} not found", job_id)))?;

        job.progress = percent.clamp(0, 100);
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn requeue(&self, job_id: Uuid) -> AppResult<JobRecord> {
        let mut inner = self.inner.lock().unwrap();
        let job = inner
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::StoreError(format!("job {} not found", job_id)))?;

        if job.state != JobState::Failed {
            return Err(AppError::ValidationError(format!(
                "job {} is {}, only failed jobs can be requeued",
                job_id, job.state
            )));
        }

        job.state = JobState::Waiting;
        job.attempts = 0;
        job.progress = 0;
        job.delay_until = None;
        job.completed_at = None;
        job.error = None;
        job.updated_at = Utc::now();

        Ok(job.to_record())
    }

    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.jobs.get(&job_id).map(|j| j.to_record()))
    }

    async fn counts(&self, queue: Queue) -> AppResult<QueueCounts> {
        let inner = self.inner.lock().unwrap();
        let mut counts = QueueCounts::default();

        for job in inner.jobs.values().filter(|j| j.queue == queue) {
            match job.state {
                JobState::Waiting => counts.waiting += 1,
                JobState::Delayed => counts.delayed += 1,
                JobState::Active => counts.active += 1,
                JobState::Completed => counts.completed += 1,
                JobState::Failed => counts.failed += 1,
            }
            counts.total += 1;
        }

        Ok(counts)
    }

    async fn purge_finished(&self) -> AppResult<usize> {
        let now = Utc::now();
        let completed_cutoff = ChronoDuration::from_std(self.retention.completed)
            .map(|d| now - d)
            .unwrap_or(now);
        let failed_cutoff = ChronoDuration::from_std(self.retention.failed)
            .map(|d| now - d)
            .unwrap_or(now);

        let mut inner = self.inner.lock().unwrap();
        let before = inner.jobs.len();

        inner.jobs.retain(|_, job| match (job.state, job.completed_at) {
            (JobState::Completed, Some(done)) => done > completed_cutoff,
            (JobState::Failed, Some(done)) => done > failed_cutoff,
            _ => true,
        });

        Ok(before - inner.jobs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::jobs::domain::entities::{CatalogSyncPayload, JobPriority};

    fn catalog_job(priority: JobPriority) -> Job {
        Job::catalog_sync(
            CatalogSyncPayload {
                artist_id: Uuid::new_v4(),
                deep: false,
            },
            priority,
        )
    }

    #[tokio::test]
    async fn delayed_job_not_eligible_until_due() {
        let store = MemoryJobStore::default();
        store
            .enqueue(
                catalog_job(JobPriority::Normal),
                EnqueueOptions::delayed(Duration::from_secs(60)),
            )
            .await
            .unwrap();

        let job = store
            .dequeue(Queue::CatalogSync, "w1", Duration::from_secs(30))
            .await
            .unwrap();
        assert!(job.is_none());
    }

    #[tokio::test]
    async fn expired_lease_makes_job_eligible_again() {
        let store = MemoryJobStore::default();
        store
            .enqueue(catalog_job(JobPriority::Normal), EnqueueOptions::default())
            .await
            .unwrap();

        let first = store
            .dequeue(Queue::CatalogSync, "w1", Duration::from_millis(10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.lease_owner.as_deref(), Some("w1"));

        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = store
            .dequeue(Queue::CatalogSync, "w2", Duration::from_secs(30))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.lease_owner.as_deref(), Some("w2"));
        assert_eq!(second.attempts, 2);
    }

    #[tokio::test]
    async fn backoff_delays_are_non_decreasing() {
        let store = MemoryJobStore::new(
            RetryConfig {
                max_attempts: 4,
                base_delay: Duration::from_secs(2),
                max_delay: Duration::from_secs(120),
            },
            RetentionConfig::default(),
        );

        let d1 = store.backoff_delay(1);
        let d2 = store.backoff_delay(2);
        let d3 = store.backoff_delay(3);
        assert!(d2 >= d1);
        assert!(d3 >= d2);
        assert!(d3 <= Duration::from_secs(120));
    }

    #[tokio::test]
    async fn requeue_only_applies_to_failed_jobs() {
        let store = MemoryJobStore::default();
        let record = store
            .enqueue(catalog_job(JobPriority::Normal), EnqueueOptions::default())
            .await
            .unwrap();

        let err = store.requeue(record.id).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
