/// Background job system module
///
/// Provides a durable, in-process job queue for the import pipeline:
/// - Named queues (profile-sync, catalog-sync, event-sync, setlist-sync)
/// - Priority and delay semantics, leases, retry with exponential backoff
/// - Worker pools with bounded concurrency and optional queue throttling
///
/// Architecture:
/// - Domain: Entities and the job store trait
/// - Infrastructure: In-process store implementation
/// - Worker: Worker pools processing leased jobs
/// - Registry: Explicitly constructed queue registry with shutdown
pub mod domain;
pub mod infrastructure;
pub mod registry;
pub mod worker;

// Re-exports for easy access
pub use domain::{
    entities::{
        CatalogSyncPayload, EventSyncPayload, Job, JobPriority, JobRecord, JobState,
        ProfileSyncPayload, Queue, SetlistSyncPayload,
    },
    repository::{EnqueueOptions, JobStore, QueueCounts},
};
pub use infrastructure::MemoryJobStore;
pub use registry::QueueRegistry;
pub use worker::{JobProcessor, WorkerPool};
