//! Shared test fixtures: scripted provider fakes and a catalog builder for
//! the end-to-end scenario.
#![allow(dead_code)]

use async_trait::async_trait;
use backline::modules::provider::domain::models::{
    AlbumSummary, ArtistProfile, Attraction, EventInfo, SetlistPage, TrackInfo, VenueInfo,
};
use backline::modules::provider::domain::ports::{
    CatalogProvider, EventsProvider, SetlistProvider,
};
use backline::shared::errors::{AppError, AppResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn track(id: &str, title: &str, album: Option<&str>) -> TrackInfo {
    TrackInfo {
        catalog_id: id.to_string(),
        title: title.to_string(),
        duration_ms: Some(200_000),
        track_number: None,
        explicit: Some(false),
        album_catalog_id: album.map(|a| a.to_string()),
    }
}

pub fn album(id: &str, title: &str, tracks: i32) -> AlbumSummary {
    AlbumSummary {
        catalog_id: id.to_string(),
        title: title.to_string(),
        album_group: Some("album".to_string()),
        release_date: Some("2013-09-09".to_string()),
        total_tracks: Some(tracks),
        image_url: None,
    }
}

/// Scripted catalog provider.
pub struct FakeCatalog {
    pub profile: ArtistProfile,
    pub albums: Vec<AlbumSummary>,
    pub album_tracks: HashMap<String, Vec<TrackInfo>>,
    pub top: Vec<TrackInfo>,
    /// Album ids whose track fetch returns a 404.
    pub missing_albums: HashSet<String>,
    pub track_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(profile: ArtistProfile) -> Self {
        Self {
            profile,
            albums: Vec::new(),
            album_tracks: HashMap::new(),
            top: Vec::new(),
            missing_albums: HashSet::new(),
            track_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_album(mut self, album: AlbumSummary, tracks: Vec<TrackInfo>) -> Self {
        self.album_tracks.insert(album.catalog_id.clone(), tracks);
        self.albums.push(album);
        self
    }

    pub fn with_top_tracks(mut self, top: Vec<TrackInfo>) -> Self {
        self.top = top;
        self
    }

    pub fn with_missing_album(mut self, album: AlbumSummary) -> Self {
        self.missing_albums.insert(album.catalog_id.clone());
        self.albums.push(album);
        self
    }
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    async fn get_artist(&self, catalog_id: &str) -> AppResult<ArtistProfile> {
        if catalog_id == self.profile.catalog_id {
            Ok(self.profile.clone())
        } else {
            Err(AppError::ProviderNotFound(format!(
                "no artist {}",
                catalog_id
            )))
        }
    }

    async fn search_artist(&self, name: &str) -> AppResult<Option<ArtistProfile>> {
        if name.eq_ignore_ascii_case(&self.profile.name) {
            Ok(Some(self.profile.clone()))
        } else {
            Ok(None)
        }
    }

    async fn list_albums(
        &self,
        artist_catalog_id: &str,
        _include_groups: &[String],
    ) -> AppResult<Vec<AlbumSummary>> {
        if artist_catalog_id != self.profile.catalog_id {
            return Err(AppError::ProviderNotFound(format!(
                "no artist {}",
                artist_catalog_id
            )));
        }
        Ok(self.albums.clone())
    }

    async fn list_album_tracks(&self, album_catalog_id: &str) -> AppResult<Vec<TrackInfo>> {
        self.track_calls.fetch_add(1, Ordering::SeqCst);
        if self.missing_albums.contains(album_catalog_id) {
            return Err(AppError::ProviderNotFound(format!(
                "no album {}",
                album_catalog_id
            )));
        }
        Ok(self
            .album_tracks
            .get(album_catalog_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn top_tracks(&self, _artist_catalog_id: &str) -> AppResult<Vec<TrackInfo>> {
        Ok(self.top.clone())
    }
}

/// Scripted events provider.
pub struct FakeEvents {
    pub attraction: Attraction,
    pub events: Vec<EventInfo>,
}

impl FakeEvents {
    pub fn new(attraction_id: &str, name: &str, catalog_url: Option<&str>) -> Self {
        Self {
            attraction: Attraction {
                attraction_id: attraction_id.to_string(),
                name: name.to_string(),
                catalog_url: catalog_url.map(|u| u.to_string()),
                image_url: None,
                genres: vec!["Rock".to_string()],
            },
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, event_id: &str, name: &str, venue: &VenueInfo) -> Self {
        self.events.push(EventInfo {
            event_id: event_id.to_string(),
            name: name.to_string(),
            starts_at: None,
            status: Some("onsale".to_string()),
            url: None,
            venue: Some(venue.clone()),
        });
        self
    }
}

#[async_trait]
impl EventsProvider for FakeEvents {
    async fn get_attraction(&self, attraction_id: &str) -> AppResult<Attraction> {
        if attraction_id == self.attraction.attraction_id {
            Ok(self.attraction.clone())
        } else {
            Err(AppError::ProviderNotFound(format!(
                "no attraction {}",
                attraction_id
            )))
        }
    }

    async fn search_events(&self, _attraction_id: &str) -> AppResult<Vec<EventInfo>> {
        Ok(self.events.clone())
    }
}

/// Setlist provider that knows nothing (the common case for new artists).
pub struct EmptySetlists;

#[async_trait]
impl SetlistProvider for EmptySetlists {
    async fn search_setlists(&self, artist_name: &str, _page: i32) -> AppResult<SetlistPage> {
        Err(AppError::ProviderNotFound(format!(
            "no setlists for {}",
            artist_name
        )))
    }
}

/// Venue fixture shared by event builders.
pub fn venue(id: &str, name: &str) -> VenueInfo {
    VenueInfo {
        venue_id: id.to_string(),
        name: name.to_string(),
        city: Some("London".to_string()),
        country: Some("United Kingdom".to_string()),
    }
}

pub fn profile(catalog_id: &str, name: &str) -> ArtistProfile {
    ArtistProfile {
        catalog_id: catalog_id.to_string(),
        name: name.to_string(),
        genres: vec!["indie rock".to_string()],
        image_url: Some("https://img.example/artist.jpg".to_string()),
        popularity: Some(85),
        followers: Some(25_000_000),
    }
}
