/// Provider ports consumed by the stage processors
///
/// HTTP adapters implement these; tests substitute mocks. Operations map
/// one-to-one onto provider endpoints, already normalized to domain shapes.
use crate::modules::provider::domain::models::{
    AlbumSummary, ArtistProfile, Attraction, EventInfo, SetlistPage, TrackInfo,
};
use crate::shared::errors::AppResult;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch an artist profile by catalog id
    async fn get_artist(&self, catalog_id: &str) -> AppResult<ArtistProfile>;

    /// Best-match artist search by name; None when nothing matches
    async fn search_artist(&self, name: &str) -> AppResult<Option<ArtistProfile>>;

    /// List albums of the given groups (album, single, compilation,
    /// appears_on), following pagination
    async fn list_albums(
        &self,
        artist_catalog_id: &str,
        include_groups: &[String],
    ) -> AppResult<Vec<AlbumSummary>>;

    /// Tracks of one album, following pagination
    async fn list_album_tracks(&self, album_catalog_id: &str) -> AppResult<Vec<TrackInfo>>;

    /// The provider's top tracks for an artist (fast path)
    async fn top_tracks(&self, artist_catalog_id: &str) -> AppResult<Vec<TrackInfo>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventsProvider: Send + Sync {
    /// Fetch an attraction by its id
    async fn get_attraction(&self, attraction_id: &str) -> AppResult<Attraction>;

    /// Upcoming events for an attraction
    async fn search_events(&self, attraction_id: &str) -> AppResult<Vec<EventInfo>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SetlistProvider: Send + Sync {
    /// One page of historical setlists for an artist name (1-based page)
    async fn search_setlists(&self, artist_name: &str, page: i32) -> AppResult<SetlistPage>;
}
