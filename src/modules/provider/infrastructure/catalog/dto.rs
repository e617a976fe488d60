/// Wire DTOs for the catalog provider
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenDto {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageDto {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowersDto {
    pub total: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogArtistDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageDto>,
    pub popularity: Option<i32>,
    pub followers: Option<FollowersDto>,
}

/// Generic offset-paged envelope
#[derive(Debug, Clone, Deserialize)]
pub struct PagingDto<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumDto {
    pub id: String,
    pub name: String,
    pub album_group: Option<String>,
    pub release_date: Option<String>,
    pub total_tracks: Option<i32>,
    #[serde(default)]
    pub images: Vec<ImageDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackDto {
    pub id: String,
    pub name: String,
    pub duration_ms: Option<i32>,
    pub track_number: Option<i32>,
    pub explicit: Option<bool>,
    pub album: Option<TrackAlbumDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackAlbumDto {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTracksDto {
    #[serde(default)]
    pub tracks: Vec<TrackDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchArtistsDto {
    pub artists: PagingDto<CatalogArtistDto>,
}
