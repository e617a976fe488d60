/// Normalized provider responses
///
/// Stage processors only ever see these shapes; the wire DTOs live with each
/// adapter and are mapped at the client boundary.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Artist profile from the catalog provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub catalog_id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub image_url: Option<String>,
    pub popularity: Option<i32>,
    pub followers: Option<i64>,
}

/// Album listing entry from the catalog provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumSummary {
    pub catalog_id: String,
    pub title: String,
    /// album / single / compilation / appears_on
    pub album_group: Option<String>,
    pub release_date: Option<String>,
    pub total_tracks: Option<i32>,
    pub image_url: Option<String>,
}

/// Track from either a top-tracks or an album-tracks listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackInfo {
    pub catalog_id: String,
    pub title: String,
    pub duration_ms: Option<i32>,
    pub track_number: Option<i32>,
    pub explicit: Option<bool>,
    /// Set when the track came from an album listing
    pub album_catalog_id: Option<String>,
}

/// Attraction record from the events provider (the import entry point)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attraction {
    pub attraction_id: String,
    pub name: String,
    /// Link to the catalog provider's artist page, when the events provider
    /// knows it
    pub catalog_url: Option<String>,
    pub image_url: Option<String>,
    pub genres: Vec<String>,
}

/// Venue from the events or setlist provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueInfo {
    pub venue_id: String,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Upcoming event from the events provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInfo {
    pub event_id: String,
    pub name: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub venue: Option<VenueInfo>,
}

/// Historical setlist from the setlist provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setlist {
    pub setlist_id: String,
    pub event_date: Option<NaiveDate>,
    pub venue: Option<VenueInfo>,
    pub tour: Option<String>,
    pub song_titles: Vec<String>,
}

/// One page of a setlist search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetlistPage {
    pub items: Vec<Setlist>,
    pub page: i32,
    pub total_pages: i32,
}
