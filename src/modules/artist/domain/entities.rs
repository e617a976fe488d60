/// Domain entities for the imported artist graph
///
/// Rows are created synchronously (the placeholder Artist) or by stage
/// workers; the pipeline never hard-deletes, it only updates (e.g. a show
/// moving upcoming -> completed).
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    /// Events-provider attraction id (import entry key)
    pub attraction_id: Option<String>,
    /// Catalog-provider artist id
    pub catalog_id: Option<String>,
    pub genres: Vec<String>,
    pub image_url: Option<String>,
    pub popularity: Option<i32>,
    pub followers: Option<i64>,
    /// Set once profile-sync has completed at least once
    pub synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Coalesce patch for artist upserts; `None` fields leave stored data alone
#[derive(Debug, Clone, Default)]
pub struct ArtistPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub catalog_id: Option<String>,
    pub genres: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub popularity: Option<i32>,
    pub followers: Option<i64>,
    pub synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: Uuid,
    pub artist_id: Uuid,
    /// Catalog-provider album id (upsert key)
    pub catalog_id: String,
    pub title: String,
    /// album / single / compilation / appears_on
    pub album_group: Option<String>,
    pub release_date: Option<String>,
    pub total_tracks: Option<i32>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct AlbumPatch {
    pub title: Option<String>,
    pub album_group: Option<String>,
    pub release_date: Option<String>,
    pub total_tracks: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    /// Catalog-provider track id (upsert key)
    pub catalog_id: String,
    pub title: String,
    pub album_id: Option<Uuid>,
    pub duration_ms: Option<i32>,
    pub track_number: Option<i32>,
    pub explicit: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SongPatch {
    pub title: Option<String>,
    pub album_id: Option<Uuid>,
    pub duration_ms: Option<i32>,
    pub track_number: Option<i32>,
    pub explicit: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    /// Events-provider venue id
    pub events_venue_id: Option<String>,
    /// Setlist-provider venue id
    pub setlist_venue_id: Option<String>,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct VenuePatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub events_venue_id: Option<String>,
    pub setlist_venue_id: Option<String>,
}

/// Show status lifecycle: upcoming -> completed/cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl std::fmt::Display for ShowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShowStatus::Upcoming => write!(f, "upcoming"),
            ShowStatus::Completed => write!(f, "completed"),
            ShowStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ShowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upcoming" | "onsale" | "offsale" => Ok(ShowStatus::Upcoming),
            "completed" => Ok(ShowStatus::Completed),
            "cancelled" | "canceled" => Ok(ShowStatus::Cancelled),
            _ => Err(format!("Invalid show status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    pub id: Uuid,
    /// Events-provider event id
    pub event_id: Option<String>,
    /// Setlist-provider setlist id (historical shows)
    pub setlist_id: Option<String>,
    pub name: Option<String>,
    pub venue_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub starts_at: Option<DateTime<Utc>>,
    pub status: ShowStatus,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ShowPatch {
    pub name: Option<String>,
    pub venue_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub starts_at: Option<DateTime<Utc>>,
    pub status: Option<ShowStatus>,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_status_parsing() {
        assert_eq!("onsale".parse::<ShowStatus>().unwrap(), ShowStatus::Upcoming);
        assert_eq!(
            "canceled".parse::<ShowStatus>().unwrap(),
            ShowStatus::Cancelled
        );
        assert!("weird".parse::<ShowStatus>().is_err());
    }
}
