/// Store traits for the imported artist graph
///
/// Upserts are keyed on provider natural ids with coalesce field semantics;
/// junction upserts are conflict-do-nothing so concurrent stage workers never
/// create duplicate links. A unique-index race inside an implementation
/// surfaces as `StoreConflict` and is resolved by re-reading (treated as
/// success), never returned to processors.
use crate::modules::artist::domain::entities::{
    Album, AlbumPatch, Artist, ArtistPatch, Show, ShowPatch, Song, SongPatch, Venue, VenuePatch,
};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ArtistStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Artist>>;

    async fn find_by_attraction_id(&self, attraction_id: &str) -> AppResult<Option<Artist>>;

    /// Insert-or-update keyed on the events-provider attraction id.
    /// `name` is always applied; patch fields coalesce.
    async fn upsert_by_attraction_id(
        &self,
        attraction_id: &str,
        name: &str,
        patch: ArtistPatch,
    ) -> AppResult<Artist>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert-or-update an album keyed on the catalog-provider album id.
    async fn upsert_album(
        &self,
        artist_id: Uuid,
        catalog_id: &str,
        title: &str,
        patch: AlbumPatch,
    ) -> AppResult<Album>;

    /// Insert-or-update a song keyed on the catalog-provider track id.
    async fn upsert_song(&self, catalog_id: &str, title: &str, patch: SongPatch)
        -> AppResult<Song>;

    /// Link a song to an artist; conflict-do-nothing on the (song, artist)
    /// pair.
    async fn link_song_artist(&self, song_id: Uuid, artist_id: Uuid) -> AppResult<()>;

    async fn songs_for_artist(&self, artist_id: Uuid) -> AppResult<Vec<Song>>;

    async fn albums_for_artist(&self, artist_id: Uuid) -> AppResult<Vec<Album>>;
}

#[async_trait]
pub trait ShowStore: Send + Sync {
    /// Insert-or-update a venue keyed on the events-provider venue id.
    async fn upsert_venue_by_events_id(
        &self,
        events_venue_id: &str,
        name: &str,
        patch: VenuePatch,
    ) -> AppResult<Venue>;

    /// Insert-or-update a venue keyed on the setlist-provider venue id.
    async fn upsert_venue_by_setlist_id(
        &self,
        setlist_venue_id: &str,
        name: &str,
        patch: VenuePatch,
    ) -> AppResult<Venue>;

    /// Insert-or-update a show keyed on the events-provider event id.
    async fn upsert_show_by_event_id(&self, event_id: &str, patch: ShowPatch) -> AppResult<Show>;

    /// Insert-or-update a historical show keyed on the setlist id.
    async fn upsert_show_by_setlist_id(
        &self,
        setlist_id: &str,
        patch: ShowPatch,
    ) -> AppResult<Show>;

    /// Link a show to an artist with headliner flag and billing position;
    /// conflict-do-nothing on the (show, artist) pair.
    async fn link_show_artist(
        &self,
        show_id: Uuid,
        artist_id: Uuid,
        headliner: bool,
        position: i32,
    ) -> AppResult<()>;

    async fn shows_for_artist(&self, artist_id: Uuid) -> AppResult<Vec<Show>>;

    async fn venue_count(&self) -> AppResult<usize>;
}
