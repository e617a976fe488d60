/// Catalog-sync stage: albums, tracks and dedup
///
/// The fast pass (top tracks + studio albums) runs first so the artist page
/// fills quickly; it enqueues a delayed, background-priority deep pass that
/// walks singles, compilations and appears-on groups exhaustively. Album
/// track fetches are per-item: a failing album is skipped and logged, the
/// stage keeps going.
use crate::modules::artist::domain::entities::{AlbumPatch, SongPatch};
use crate::modules::artist::domain::repository::{ArtistStore, CatalogStore};
use crate::modules::import::progress::{ImportStage, PipelineStage};
use crate::modules::import::stages::types::{SkipReason, StageSummary};
use crate::modules::import::stages::Finalizer;
use crate::modules::jobs::domain::entities::{CatalogSyncPayload, Job, JobPriority, JobRecord};
use crate::modules::jobs::domain::repository::{EnqueueOptions, JobStore};
use crate::modules::jobs::worker::JobProcessor;
use crate::modules::provider::domain::models::{AlbumSummary, TrackInfo};
use crate::modules::provider::domain::ports::CatalogProvider;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_debug, log_info, log_warn};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Album groups walked by the fast pass.
const FAST_GROUPS: [&str; 1] = ["album"];
/// Album groups walked by the deep pass.
const DEEP_GROUPS: [&str; 4] = ["album", "single", "compilation", "appears_on"];

pub struct CatalogSyncProcessor {
    artists: Arc<dyn ArtistStore>,
    store: Arc<dyn CatalogStore>,
    catalog: Arc<dyn CatalogProvider>,
    jobs: Arc<dyn JobStore>,
    finalizer: Arc<Finalizer>,
    /// Delay before the exhaustive pass, so the fast path lands first.
    deep_delay: Duration,
}

impl CatalogSyncProcessor {
    pub fn new(
        artists: Arc<dyn ArtistStore>,
        store: Arc<dyn CatalogStore>,
        catalog: Arc<dyn CatalogProvider>,
        jobs: Arc<dyn JobStore>,
        finalizer: Arc<Finalizer>,
        deep_delay: Duration,
    ) -> Self {
        Self {
            artists,
            store,
            catalog,
            jobs,
            finalizer,
            deep_delay,
        }
    }

    /// Per-item track fetch; any failure becomes a skip so the stage keeps
    /// processing the remaining albums.
    async fn fetch_album_tracks(
        &self,
        album: &AlbumSummary,
    ) -> Result<Vec<TrackInfo>, SkipReason> {
        self.catalog
            .list_album_tracks(&album.catalog_id)
            .await
            .map_err(|e| SkipReason {
                item: album.catalog_id.clone(),
                reason: e.to_string(),
            })
    }

    async fn upsert_tracks(
        &self,
        artist_id: Uuid,
        tracks: Vec<TrackInfo>,
        album_ids: &HashMap<String, Uuid>,
    ) -> AppResult<usize> {
        let count = tracks.len();
        for track in tracks {
            let album_id = track
                .album_catalog_id
                .as_ref()
                .and_then(|cid| album_ids.get(cid))
                .copied();

            let song = self
                .store
                .upsert_song(
                    &track.catalog_id,
                    &track.title,
                    SongPatch {
                        album_id,
                        duration_ms: track.duration_ms,
                        track_number: track.track_number,
                        explicit: track.explicit,
                        ..SongPatch::default()
                    },
                )
                .await?;
            self.store.link_song_artist(song.id, artist_id).await?;
        }
        Ok(count)
    }
}

/// Keep the first-seen record per catalog track id, dropping later
/// duplicates before any upsert is issued. The same logical track commonly
/// appears in both the top-tracks listing and an album listing.
pub fn dedup_tracks(tracks: Vec<TrackInfo>) -> (Vec<TrackInfo>, usize) {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(tracks.len());
    let mut dropped = 0;

    for track in tracks {
        if seen.insert(track.catalog_id.clone()) {
            unique.push(track);
        } else {
            dropped += 1;
        }
    }

    (unique, dropped)
}

#[async_trait]
impl JobProcessor for CatalogSyncProcessor {
    async fn process(&self, job: &JobRecord) -> AppResult<()> {
        let payload = job
            .parse_catalog_payload()
            .map_err(|e| AppError::ValidationError(format!("invalid catalog payload: {}", e)))?;
        let key = payload.artist_id.to_string();
        let progress = self.finalizer.progress();
        let stage_token = if payload.deep {
            PipelineStage::DeepCatalog
        } else {
            PipelineStage::Catalog
        };

        let artist = self
            .artists
            .find_by_id(payload.artist_id)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(format!("artist {} not found", payload.artist_id))
            })?;

        let Some(catalog_id) = artist.catalog_id.clone() else {
            // No catalog identity resolved; the deep pass was never queued
            log_warn!("Artist {} has no catalog id, skipping catalog sync", artist.name);
            self.finalizer.stage_done(&key, PipelineStage::Catalog).await;
            self.finalizer
                .stage_done(&key, PipelineStage::DeepCatalog)
                .await;
            return Ok(());
        };

        let (base, span): (usize, usize) = if payload.deep { (75, 15) } else { (50, 25) };
        progress.report(
            &key,
            ImportStage::ImportingSongs,
            base as i32,
            "Importing catalog",
        );

        let mut summary = StageSummary::default();
        let mut all_tracks: Vec<TrackInfo> = Vec::new();

        // Fast path surfaces the provider's top tracks before any album walk
        if !payload.deep {
            match self.catalog.top_tracks(&catalog_id).await {
                Ok(tracks) => {
                    log_debug!("Fetched {} top tracks for {}", tracks.len(), artist.name);
                    all_tracks.extend(tracks);
                }
                Err(e) => {
                    log_warn!("Top tracks for {} skipped: {}", artist.name, e);
                    summary.skip("top-tracks", &e.to_string());
                }
            }
        }

        let groups: Vec<String> = if payload.deep {
            DEEP_GROUPS.iter().map(|g| g.to_string()).collect()
        } else {
            FAST_GROUPS.iter().map(|g| g.to_string()).collect()
        };

        // Core purpose: without the album listing the stage cannot proceed
        let albums = self.catalog.list_albums(&catalog_id, &groups).await?;
        let total = albums.len().max(1);
        let mut album_ids: HashMap<String, Uuid> = HashMap::new();

        for (index, album) in albums.iter().enumerate() {
            let upserted = self
                .store
                .upsert_album(
                    artist.id,
                    &album.catalog_id,
                    &album.title,
                    AlbumPatch {
                        album_group: album.album_group.clone(),
                        release_date: album.release_date.clone(),
                        total_tracks: album.total_tracks,
                        image_url: album.image_url.clone(),
                        ..AlbumPatch::default()
                    },
                )
                .await?;
            album_ids.insert(album.catalog_id.clone(), upserted.id);

            match self.fetch_album_tracks(album).await {
                Ok(tracks) => {
                    all_tracks.extend(tracks);
                    summary.processed();
                }
                Err(skip) => {
                    log_warn!("Album {} skipped: {}", skip.item, skip.reason);
                    summary.skipped.push(skip);
                }
            }

            let done = index + 1;
            progress.report(
                &key,
                ImportStage::ImportingSongs,
                (base + span * done / total) as i32,
                &format!("Imported {}/{} albums", done, total),
            );
            self.jobs
                .update_progress(job.id, (done * 100 / total) as i32)
                .await?;
        }

        let (unique, duplicates) = dedup_tracks(all_tracks);
        if duplicates > 0 {
            log_debug!(
                "Dropped {} duplicate track listings for {}",
                duplicates,
                artist.name
            );
        }
        let songs = self.upsert_tracks(artist.id, unique, &album_ids).await?;

        progress.report(
            &key,
            ImportStage::ImportingSongs,
            (base + span) as i32,
            &summary.describe("albums"),
        );
        log_info!(
            "Catalog sync for {} done: {} albums, {} songs, {} skipped",
            artist.name,
            albums.len(),
            songs,
            summary.skipped.len()
        );

        if !payload.deep {
            self.jobs
                .enqueue(
                    Job::catalog_sync(
                        CatalogSyncPayload {
                            artist_id: artist.id,
                            deep: true,
                        },
                        JobPriority::Background,
                    ),
                    EnqueueOptions::delayed(self.deep_delay),
                )
                .await?;
        }

        self.finalizer.stage_done(&key, stage_token).await;
        Ok(())
    }

    async fn on_exhausted(&self, job: &JobRecord, error: &AppError) {
        if let Ok(payload) = job.parse_catalog_payload() {
            self.finalizer
                .progress()
                .fail(&payload.artist_id.to_string(), &error.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> TrackInfo {
        TrackInfo {
            catalog_id: id.to_string(),
            title: format!("track {}", id),
            duration_ms: None,
            track_number: None,
            explicit: None,
            album_catalog_id: None,
        }
    }

    #[test]
    fn dedup_keeps_first_seen() {
        let tracks = vec![track("a"), track("b"), track("a"), track("c"), track("b")];
        let (unique, dropped) = dedup_tracks(tracks);

        assert_eq!(dropped, 2);
        let ids: Vec<_> = unique.iter().map(|t| t.catalog_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn dedup_handles_empty_input() {
        let (unique, dropped) = dedup_tracks(Vec::new());
        assert!(unique.is_empty());
        assert_eq!(dropped, 0);
    }
}
