/// Setlist-sync stage: historical shows from the setlist provider
///
/// The strictest-limited provider, so the stage pages conservatively and the
/// whole queue is throughput-capped. An artist unknown to the setlist
/// provider is a normal outcome, not a failure.
use crate::modules::artist::domain::entities::{ShowPatch, VenuePatch};
use crate::modules::artist::domain::repository::{ArtistStore, ShowStore};
use crate::modules::import::progress::{ImportStage, PipelineStage};
use crate::modules::import::stages::types::{SkipReason, StageSummary};
use crate::modules::import::stages::Finalizer;
use crate::modules::jobs::domain::entities::JobRecord;
use crate::modules::jobs::worker::JobProcessor;
use crate::modules::provider::domain::models::Setlist;
use crate::modules::provider::domain::ports::SetlistProvider;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_info, log_warn};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Pages fetched per run; the archive is deep and the provider is slow.
const MAX_SETLIST_PAGES: i32 = 5;

pub struct SetlistSyncProcessor {
    artists: Arc<dyn ArtistStore>,
    store: Arc<dyn ShowStore>,
    setlists: Arc<dyn SetlistProvider>,
    finalizer: Arc<Finalizer>,
}

impl SetlistSyncProcessor {
    pub fn new(
        artists: Arc<dyn ArtistStore>,
        store: Arc<dyn ShowStore>,
        setlists: Arc<dyn SetlistProvider>,
        finalizer: Arc<Finalizer>,
    ) -> Self {
        Self {
            artists,
            store,
            setlists,
            finalizer,
        }
    }

    async fn import_setlist(
        &self,
        artist_id: Uuid,
        artist_name: &str,
        setlist: &Setlist,
    ) -> AppResult<()> {
        let venue_id = match &setlist.venue {
            Some(venue) => Some(
                self.store
                    .upsert_venue_by_setlist_id(
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

        let name = setlist
            .venue
            .as_ref()
            .map(|venue| format!("{} at {}", artist_name, venue.name));

        let show = self
            .store
            .upsert_show_by_setlist_id(
                &setlist.setlist_id,
                ShowPatch {
                    name,
                    venue_id,
                    date: setlist.event_date,
                    ..ShowPatch::default()
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
impl JobProcessor for SetlistSyncProcessor {
    async fn process(&self, job: &JobRecord) -> AppResult<()> {
        let payload = job
            .parse_setlist_payload()
            .map_err(|e| AppError::ValidationError(format!("invalid setlist payload: {}", e)))?;
        let key = payload.artist_id.to_string();
        let progress = self.finalizer.progress();

        let artist = self
            .artists
            .find_by_id(payload.artist_id)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(format!("artist {} not found", payload.artist_id))
            })?;

        progress.report(
            &key,
            ImportStage::CreatingSetlists,
            80,
            "Importing historical setlists",
        );

        let first_page = match self.setlists.search_setlists(&artist.name, 1).await {
            Ok(page) => page,
            Err(AppError::ProviderNotFound(_)) => {
                // Unknown to the archive; finish the stage empty-handed
                log_info!("No setlists known for {}", artist.name);
                progress.report(&key, ImportStage::CreatingSetlists, 90, "No setlists found");
                self.finalizer
                    .stage_done(&key, PipelineStage::Setlists)
                    .await;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let mut summary = StageSummary::default();
        let total_pages = first_page.total_pages.min(MAX_SETLIST_PAGES);
        let mut pages = vec![first_page];

        for page_no in 2..=total_pages {
            match self.setlists.search_setlists(&artist.name, page_no).await {
                Ok(page) => pages.push(page),
                Err(e) => {
                    // Later pages are sub-items; keep what we have
                    log_warn!("Setlist page {} for {} skipped: {}", page_no, artist.name, e);
                    summary.skipped.push(SkipReason {
                        item: format!("page-{}", page_no),
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        for setlist in pages.iter().flat_map(|p| p.items.iter()) {
            match self
                .import_setlist(artist.id, &artist.name, setlist)
                .await
            {
                Ok(()) => summary.processed(),
                Err(e) => {
                    log_warn!("Setlist {} skipped: {}", setlist.setlist_id, e);
                    summary.skipped.push(SkipReason {
                        item: setlist.setlist_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        progress.report(
            &key,
            ImportStage::CreatingSetlists,
            90,
            &summary.describe("setlists"),
        );
        log_info!(
            "Setlist sync for {} done: {} setlists, {} skipped",
            artist.name,
            summary.processed,
            summary.skipped.len()
        );

        self.finalizer
            .stage_done(&key, PipelineStage::Setlists)
            .await;
        Ok(())
    }

    async fn on_exhausted(&self, job: &JobRecord, error: &AppError) {
        if let Ok(payload) = job.parse_setlist_payload() {
            self.finalizer
                .progress()
                .fail(&payload.artist_id.to_string(), &error.to_string());
        }
    }
}
