/// Stage processors for the import pipeline
///
/// Each stage is a `JobProcessor` registered on its queue. Per-item work
/// returns `Result<_, SkipReason>` and stages aggregate a summary, so the
/// partial-failure contract is explicit: a skipped sub-item never fails the
/// job, only a failure of the stage's core purpose does.
pub mod catalog;
pub mod events;
pub mod profile;
pub mod setlists;
pub mod types;

pub use types::{SkipReason, StageSummary};

use crate::modules::import::cache::CacheInvalidator;
use crate::modules::import::progress::{ImportStage, PipelineStage, ProgressTracker};
use crate::{log_info, log_warn};
use std::sync::Arc;

/// Arbitrates run completion across parallel stages.
///
/// Every stage processor reports completion here; whichever stage finishes
/// the registered set last runs finalization (cache invalidation on forced
/// refreshes, terminal status).
pub struct Finalizer {
    progress: Arc<ProgressTracker>,
    cache: Arc<dyn CacheInvalidator>,
}

impl Finalizer {
    pub fn new(progress: Arc<ProgressTracker>, cache: Arc<dyn CacheInvalidator>) -> Self {
        Self { progress, cache }
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Mark a pipeline stage done and finalize the run when it was the last.
    pub async fn stage_done(&self, key: &str, stage: PipelineStage) {
        if !self.progress.complete_stage(key, stage) {
            return;
        }

        self.progress
            .report(key, ImportStage::Finalizing, 95, "Finalizing import");

        if self.progress.force_refresh(key) {
            let pattern = format!("artist:{}:*", key);
            match self.cache.invalidate_pattern(&pattern).await {
                Ok(evicted) => {
                    log_info!("Evicted {} cache keys for {}", evicted, key)
                }
                Err(e) => {
                    // Cache is freshness-only; never fail the run over it
                    log_warn!("Cache invalidation for {} failed: {}", key, e)
                }
            }
        }

        self.progress.finish(key);
        log_info!("Import {} completed", key);
    }
}
