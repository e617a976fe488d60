pub mod entities;
pub mod repository;

pub use entities::{Job, JobPriority, JobRecord, JobState, Queue};
pub use repository::{EnqueueOptions, JobStore, QueueCounts};
