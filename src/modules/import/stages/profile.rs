/// Profile-sync stage: resolve provider identifiers and seed the artist row
///
/// Fetches the attraction from the events provider, resolves the matching
/// catalog-provider artist (external link first, name search as fallback),
/// upserts the artist and fans out the catalog-sync and event-sync jobs.
/// Failing to reach the events provider fails the job (retryable); a missing
/// catalog identity only skips catalog enrichment.
use crate::modules::artist::domain::entities::ArtistPatch;
use crate::modules::artist::domain::repository::ArtistStore;
use crate::modules::import::progress::{ImportStage, PipelineStage};
use crate::modules::import::stages::Finalizer;
use crate::modules::jobs::domain::entities::{
    CatalogSyncPayload, EventSyncPayload, Job, JobPriority, JobRecord,
};
use crate::modules::jobs::domain::repository::{EnqueueOptions, JobStore};
use crate::modules::jobs::worker::JobProcessor;
use crate::modules::provider::domain::models::ArtistProfile;
use crate::modules::provider::domain::ports::{CatalogProvider, EventsProvider};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::slug::slugify;
use crate::{log_debug, log_info, log_warn};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

pub struct ProfileSyncProcessor {
    artists: Arc<dyn ArtistStore>,
    catalog: Arc<dyn CatalogProvider>,
    events: Arc<dyn EventsProvider>,
    jobs: Arc<dyn JobStore>,
    finalizer: Arc<Finalizer>,
}

impl ProfileSyncProcessor {
    pub fn new(
        artists: Arc<dyn ArtistStore>,
        catalog: Arc<dyn CatalogProvider>,
        events: Arc<dyn EventsProvider>,
        jobs: Arc<dyn JobStore>,
        finalizer: Arc<Finalizer>,
    ) -> Self {
        Self {
            artists,
            catalog,
            events,
            jobs,
            finalizer,
        }
    }

    /// Resolve the catalog-provider identity of the artist.
    ///
    /// A dead link or an artist the catalog provider does not know is a
    /// skip, not a stage failure; transient provider trouble propagates so
    /// the job retries.
    async fn resolve_catalog_profile(
        &self,
        catalog_url: Option<&str>,
        name: &str,
    ) -> AppResult<Option<ArtistProfile>> {
        if let Some(catalog_id) = catalog_url.and_then(extract_catalog_id) {
            match self.catalog.get_artist(&catalog_id).await {
                Ok(profile) => return Ok(Some(profile)),
                Err(AppError::ProviderNotFound(_)) => {
                    log_warn!("Catalog link for '{}' is dead, falling back to search", name)
                }
                Err(e) => return Err(e),
            }
        }

        match self.catalog.search_artist(name).await {
            Ok(found) => Ok(found),
            Err(AppError::ProviderNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Last path segment of a catalog artist URL, e.g.
/// `https://open.spotify.com/artist/7Ln80l...` -> `7Ln80l...`
fn extract_catalog_id(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let (prefix, id) = trimmed.rsplit_once('/')?;
    if !prefix.contains("artist") || id.is_empty() {
        return None;
    }
    Some(id.split('?').next().unwrap_or(id).to_string())
}

#[async_trait]
impl JobProcessor for ProfileSyncProcessor {
    async fn process(&self, job: &JobRecord) -> AppResult<()> {
        let payload = job
            .parse_profile_payload()
            .map_err(|e| AppError::ValidationError(format!("invalid profile payload: {}", e)))?;
        let key = payload.artist_id.to_string();
        let progress = self.finalizer.progress();

        progress.report(
            &key,
            ImportStage::SyncingIdentifiers,
            5,
            "Resolving provider identifiers",
        );

        // Core purpose: without the attraction there is nothing to import
        let attraction = self.events.get_attraction(&payload.attraction_id).await?;
        log_debug!(
            "Attraction {} resolved to '{}'",
            payload.attraction_id,
            attraction.name
        );

        let catalog_profile = self
            .resolve_catalog_profile(attraction.catalog_url.as_deref(), &attraction.name)
            .await?;

        let name = catalog_profile
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| attraction.name.clone());

        let mut patch = ArtistPatch {
            slug: Some(slugify(&name)),
            genres: Some(if let Some(profile) = &catalog_profile {
                profile.genres.clone()
            } else {
                attraction.genres.clone()
            }),
            image_url: catalog_profile
                .as_ref()
                .and_then(|p| p.image_url.clone())
                .or(attraction.image_url.clone()),
            synced_at: Some(Utc::now()),
            ..ArtistPatch::default()
        };
        if let Some(profile) = &catalog_profile {
            patch.catalog_id = Some(profile.catalog_id.clone());
            patch.popularity = profile.popularity;
            patch.followers = profile.followers;
        }

        let artist = self
            .artists
            .upsert_by_attraction_id(&payload.attraction_id, &name, patch)
            .await?;

        progress.report(
            &key,
            ImportStage::SyncingIdentifiers,
            20,
            &format!("Synced identifiers for {}", artist.name),
        );

        // Fan out: catalog and events run on independent queues
        let priority = JobPriority::from_i32(job.priority);
        self.jobs
            .enqueue(
                Job::catalog_sync(
                    CatalogSyncPayload {
                        artist_id: artist.id,
                        deep: false,
                    },
                    priority,
                ),
                EnqueueOptions::default(),
            )
            .await?;
        self.jobs
            .enqueue(
                Job::event_sync(EventSyncPayload { artist_id: artist.id }, priority),
                EnqueueOptions::default(),
            )
            .await?;

        log_info!("Profile sync for {} complete, follow-up stages queued", artist.name);
        self.finalizer.stage_done(&key, PipelineStage::Profile).await;
        Ok(())
    }

    async fn on_exhausted(&self, job: &JobRecord, error: &AppError) {
        if let Ok(payload) = job.parse_profile_payload() {
            self.finalizer
                .progress()
                .fail(&payload.artist_id.to_string(), &error.to_string());
        }
    }
}
