/// Import orchestrator - the synchronous entry point
///
/// Creates or finds the artist row up front so the caller gets a stable id
/// immediately, registers the run with the progress tracker, enqueues the
/// first stage and returns. Repeat calls with the same attraction id are
/// idempotent: they find the existing row and start a superseding run.
use crate::modules::artist::domain::entities::ArtistPatch;
use crate::modules::artist::domain::repository::ArtistStore;
use crate::modules::import::progress::{ImportStatus, ProgressTracker};
use crate::modules::jobs::domain::entities::{Job, JobPriority, ProfileSyncPayload};
use crate::modules::jobs::domain::repository::{EnqueueOptions, JobStore};
use crate::shared::errors::{AppError, AppResult};
use crate::log_info;
use std::sync::Arc;
use uuid::Uuid;

/// Options for one import run
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub priority: JobPriority,
    pub admin_import: bool,
    /// Re-import even when already synced, and evict caches afterwards
    pub force_refresh: bool,
    /// Best-effort display name for the placeholder row
    pub name_hint: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            priority: JobPriority::Normal,
            admin_import: false,
            force_refresh: false,
            name_hint: None,
        }
    }
}

/// What the caller gets back immediately
#[derive(Debug, Clone)]
pub struct ImportReceipt {
    pub artist_id: Uuid,
    pub slug: String,
    pub job_id: Uuid,
}

pub struct ImportOrchestrator {
    artists: Arc<dyn ArtistStore>,
    jobs: Arc<dyn JobStore>,
    progress: Arc<ProgressTracker>,
}

impl ImportOrchestrator {
    pub fn new(
        artists: Arc<dyn ArtistStore>,
        jobs: Arc<dyn JobStore>,
        progress: Arc<ProgressTracker>,
    ) -> Self {
        Self {
            artists,
            jobs,
            progress,
        }
    }

    /// Start (or restart) a full import for an events-provider attraction.
    pub async fn import_artist(
        &self,
        attraction_id: &str,
        opts: ImportOptions,
    ) -> AppResult<ImportReceipt> {
        if attraction_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "attraction id cannot be empty".to_string(),
            ));
        }

        let artist = match self.artists.find_by_attraction_id(attraction_id).await? {
            Some(existing) => existing,
            None => {
                // Placeholder row: the caller gets an id before any provider
                // call happens; profile-sync fills in the real data
                let name = opts
                    .name_hint
                    .clone()
                    .unwrap_or_else(|| format!("Artist {}", attraction_id));
                self.artists
                    .upsert_by_attraction_id(attraction_id, &name, ArtistPatch::default())
                    .await?
            }
        };

        let key = artist.id.to_string();
        self.progress.start(&key, opts.force_refresh);

        let job = self
            .jobs
            .enqueue(
                Job::profile_sync(
                    ProfileSyncPayload {
                        artist_id: artist.id,
                        attraction_id: attraction_id.to_string(),
                        force_refresh: opts.force_refresh,
                        admin_import: opts.admin_import,
                    },
                    opts.priority,
                ),
                EnqueueOptions::default(),
            )
            .await?;

        log_info!(
            "Import queued for '{}' (artist {}, job {})",
            artist.name,
            artist.id,
            job.id
        );

        Ok(ImportReceipt {
            artist_id: artist.id,
            slug: artist.slug,
            job_id: job.id,
        })
    }

    /// Poll the status of an import run by artist id.
    pub fn get_import_status(&self, key: &str) -> Option<ImportStatus> {
        self.progress.get(key)
    }
}
