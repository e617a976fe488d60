/// Import orchestration module
///
/// The orchestrator is the only entry point callers invoke: it creates the
/// placeholder artist synchronously, enqueues the first stage and returns
/// immediately. Stage processors run on worker pools, report through the
/// progress tracker and enqueue their follow-up stages.
pub mod cache;
pub mod orchestrator;
pub mod progress;
pub mod stages;

pub use cache::{CacheInvalidator, MemoryCache};
pub use orchestrator::{ImportOptions, ImportOrchestrator, ImportReceipt};
pub use progress::{ImportStage, ImportStatus, PipelineStage, ProgressTracker};
pub use stages::{
    catalog::CatalogSyncProcessor, events::EventSyncProcessor, profile::ProfileSyncProcessor,
    setlists::SetlistSyncProcessor, Finalizer, SkipReason, StageSummary,
};
