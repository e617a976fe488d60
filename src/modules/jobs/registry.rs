/// Explicitly constructed registry of queue worker pools
///
/// Replaces the lazily-created process-wide queue map of the original
/// system: the registry is built once at wiring time, passed to whichever
/// component needs it, and owns shutdown of every pool it holds.
use crate::modules::jobs::domain::entities::Queue;
use crate::modules::jobs::domain::repository::{JobStore, QueueCounts};
use crate::modules::jobs::worker::WorkerPool;
use crate::shared::errors::{AppError, AppResult};
use crate::log_info;
use futures::future;
use std::collections::HashMap;
use std::sync::Arc;

pub struct QueueRegistry {
    store: Arc<dyn JobStore>,
    pools: HashMap<Queue, Arc<WorkerPool>>,
}

impl QueueRegistry {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            pools: HashMap::new(),
        }
    }

    /// Register a pool for its queue. Last registration wins.
    pub fn register(&mut self, pool: Arc<WorkerPool>) {
        self.pools.insert(pool.queue(), pool);
    }

    pub fn store(&self) -> Arc<dyn JobStore> {
        Arc::clone(&self.store)
    }

    pub fn pool(&self, queue: Queue) -> Option<Arc<WorkerPool>> {
        self.pools.get(&queue).cloned()
    }

    /// Start every registered pool.
    pub async fn start_all(&self) {
        future::join_all(self.pools.values().map(|pool| Arc::clone(pool).start())).await;
        log_info!("Queue registry started {} pools", self.pools.len());
    }

    /// Stop every registered pool, waiting for in-flight jobs.
    pub async fn shutdown(&self) {
        future::join_all(self.pools.values().map(|pool| pool.shutdown())).await;
        log_info!("Queue registry shut down");
    }

    /// Job counts by state for one queue (operational tooling).
    pub async fn counts(&self, queue: Queue) -> AppResult<QueueCounts> {
        if !self.pools.contains_key(&queue) {
            return Err(AppError::ValidationError(format!(
                "no pool registered for queue {}",
                queue
            )));
        }
        self.store.counts(queue).await
    }
}
