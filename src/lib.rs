//! backline - artist import pipeline
//!
//! Ingests an artist's profile, discography, shows and venues from three
//! rate-limited external providers into a consistent local store, through a
//! queued, retrying, circuit-broken worker pipeline. `import_artist` returns
//! immediately; pollers follow the keyed import status.

pub mod modules;
pub mod pipeline;
pub mod shared;

pub use modules::import::{ImportOptions, ImportOrchestrator, ImportReceipt, ImportStatus};
pub use pipeline::Pipeline;
pub use shared::errors::{AppError, AppResult};
pub use shared::PipelineConfig;
