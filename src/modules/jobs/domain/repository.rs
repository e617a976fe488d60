/// Store trait for job persistence
///
/// Defines the interface for the durable queue: enqueue with priority and
/// delay, dequeue with a lease, ack/retry/fail, progress updates, and
/// operational introspection. Workers hold a lease, never a copy of truth.
use crate::modules::jobs::domain::entities::{Job, JobPriority, JobRecord, Queue};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

/// Options applied at enqueue time
#[derive(Debug, Clone, Default)]
pub struct EnqueueOptions {
    /// Overrides the priority the job was constructed with.
    pub priority: Option<JobPriority>,
    /// Job becomes eligible only after this delay.
    pub delay: Option<Duration>,
}

impl EnqueueOptions {
    pub fn delayed(delay: Duration) -> Self {
        Self {
            priority: None,
            delay: Some(delay),
        }
    }
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Durably append a waiting (or delayed) job
    async fn enqueue(&self, job: Job, opts: EnqueueOptions) -> AppResult<JobRecord>;

    /// Lease the next eligible job of the queue to `worker_id` for `lease`.
    ///
    /// Eligible means waiting, delayed past its due time, or active with an
    /// expired lease. Ordering is priority first, then eligible-time FIFO.
    /// Returns None if no jobs are eligible.
    async fn dequeue(
        &self,
        queue: Queue,
        worker_id: &str,
        lease: Duration,
    ) -> AppResult<Option<JobRecord>>;

    /// Ack: mark the leased job completed
    async fn mark_completed(&self, job_id: Uuid) -> AppResult<()>;

    /// Mark the leased job failed.
    ///
    /// When `retryable` and attempts remain, the job re-enters the queue as
    /// delayed with exponential backoff; otherwise it is failed permanently.
    /// Returns the updated record so callers can see the resulting state.
    async fn mark_failed(&self, job_id: Uuid, error: &str, retryable: bool)
        -> AppResult<JobRecord>;

    /// Record fractional progress (0-100) for a leased job
    async fn update_progress(&self, job_id: Uuid, percent: i32) -> AppResult<()>;

    /// Operator action: put a permanently failed job back in its queue
    async fn requeue(&self, job_id: Uuid) -> AppResult<JobRecord>;

    /// Get job by ID
    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>>;

    /// Job counts by state for a queue (for operational tooling)
    async fn counts(&self, queue: Queue) -> AppResult<QueueCounts>;

    /// Delete completed/failed jobs past their retention windows
    async fn purge_finished(&self) -> AppResult<usize>;
}

/// Job counts by state for one queue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueCounts {
    pub waiting: i64,
    pub delayed: i64,
    pub active: i64,
    pub completed: i64,
    pub failed: i64,
    pub total: i64,
}
