/// Event-sync stage: upcoming shows and venues
///
/// Runs in parallel with catalog-sync on its own queue and therefore
/// re-reads the artist row rather than trusting any in-memory state from
/// profile-sync. Each event imports as a per-item result; a bad event is
/// skipped, not fatal. Finishing enqueues the setlist-sync stage.
use crate::modules::artist::domain::entities::{ShowPatch, ShowStatus, VenuePatch};
use crate::modules::artist::domain::repository::{ArtistStore, ShowStore};
use crate::modules::import::progress::{ImportStage, PipelineStage};
use crate::modules::import::stages::types::{SkipReason, StageSummary};
use crate::modules::import::stages::Finalizer;
use crate::modules::jobs::domain::entities::{Job, JobPriority, JobRecord, SetlistSyncPayload};
use crate::modules::jobs::domain::repository::{EnqueueOptions, JobStore};
use crate::modules::jobs::worker::JobProcessor;
use crate::modules::provider::domain::models::EventInfo;
use crate::modules::provider::domain::ports::EventsProvider;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_info, log_warn};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub struct EventSyncProcessor {
    artists: Arc<dyn ArtistStore>,
    store: Arc<dyn ShowStore>,
    events: Arc<dyn EventsProvider>,
    jobs: Arc<dyn JobStore>,
    finalizer: Arc<Finalizer>,
}

impl EventSyncProcessor {
    pub fn new(
        artists: Arc<dyn ArtistStore>,
        store: Arc<dyn ShowStore>,
        events: Arc<dyn EventsProvider>,
        jobs: Arc<dyn JobStore>,
        finalizer: Arc<Finalizer>,
    ) -> Self {
        Self {
            artists,
            store,
            events,
            jobs,
            finalizer,
        }
    }

    async fn import_event(&self, artist_id: Uuid, event: &EventInfo) -> AppResult<()> {
        let venue_id = match &event.venue {
            Some(venue) => Some(
                self.store
                    .upsert_venue_by_events_id(
                        &venue.venue_id,
                        &venue.name,
                        VenuePatch {
                            city: venue.city.clone(),
                            country: venue.country.clone(),
                            ..VenuePatch::default()
                        },
                    )
                    .await?
                    .id,
            ),
            None => None,
        };

        let status = event
            .status
            .as_deref()
            .and_then(|code| code.parse::<ShowStatus>().ok())
            .unwrap_or(ShowStatus::Upcoming);

        let show = self
            .store
            .upsert_show_by_event_id(
                &event.event_id,
                ShowPatch {
                    name: Some(event.name.clone()),
                    venue_id,
                    date: event.starts_at.map(|dt| dt.date_naive()),
                    starts_at: event.starts_at,
                    status: Some(status),
                    url: event.url.clone(),
                },
            )
            .await?;

        self.store
            .link_show_artist(show.id, artist_id, true, 0)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl JobProcessor for EventSyncProcessor {
    async fn process(&self, job: &JobRecord) -> AppResult<()> {
        let payload = job
            .parse_event_payload()
            .map_err(|e| AppError::ValidationError(format!("invalid event payload: {}", e)))?;
        let key = payload.artist_id.to_string();
        let progress = self.finalizer.progress();

        // Re-read: profile-sync may or may not have finished enriching
        let artist = self
            .artists
            .find_by_id(payload.artist_id)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(format!("artist {} not found", payload.artist_id))
            })?;
        let attraction_id = artist.attraction_id.clone().ok_or_else(|| {
            AppError::ValidationError(format!("artist {} has no attraction id", artist.name))
        })?;

        progress.report(
            &key,
            ImportStage::ImportingShows,
            30,
            "Importing upcoming shows",
        );

        // Core purpose: no event listing, nothing to import
        let events = self.events.search_events(&attraction_id).await?;

        let mut summary = StageSummary::default();
        for event in &events {
            match self.import_event(artist.id, event).await {
                Ok(()) => summary.processed(),
                Err(e) => {
                    log_warn!("Event {} skipped: {}", event.event_id, e);
                    summary.skipped.push(SkipReason {
                        item: event.event_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        progress.report(
            &key,
            ImportStage::ImportingShows,
            45,
            &summary.describe("shows"),
        );
        log_info!(
            "Event sync for {} done: {} shows, {} skipped",
            artist.name,
            summary.processed,
            summary.skipped.len()
        );

        // Historical setlists follow once shows are known
        self.jobs
            .enqueue(
                Job::setlist_sync(
                    SetlistSyncPayload {
                        artist_id: artist.id,
                    },
                    JobPriority::Low,
                ),
                EnqueueOptions::default(),
            )
            .await?;

        self.finalizer.stage_done(&key, PipelineStage::Events).await;
        Ok(())
    }

    async fn on_exhausted(&self, job: &JobRecord, error: &AppError) {
        if let Ok(payload) = job.parse_event_payload() {
            self.finalizer
                .progress()
                .fail(&payload.artist_id.to_string(), &error.to_string());
        }
    }
}
