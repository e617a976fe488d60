/// Maps catalog wire DTOs to domain shapes
use super::dto::{AlbumDto, CatalogArtistDto, TrackDto};
use crate::modules::provider::domain::models::{AlbumSummary, ArtistProfile, TrackInfo};

pub struct CatalogMapper;

impl CatalogMapper {
    pub fn profile(dto: CatalogArtistDto) -> ArtistProfile {
        ArtistProfile {
            catalog_id: dto.id,
            name: dto.name,
            genres: dto.genres,
            image_url: dto.images.into_iter().next().map(|i| i.url),
            popularity: dto.popularity,
            followers: dto.followers.and_then(|f| f.total),
        }
    }

    pub fn album(dto: AlbumDto) -> AlbumSummary {
        AlbumSummary {
            catalog_id: dto.id,
            title: dto.name,
            album_group: dto.album_group,
            release_date: dto.release_date,
            total_tracks: dto.total_tracks,
            image_url: dto.images.into_iter().next().map(|i| i.url),
        }
    }

    pub fn track(dto: TrackDto, album_catalog_id: Option<String>) -> TrackInfo {
        let album_catalog_id = album_catalog_id.or(dto.album.map(|a| a.id));
        TrackInfo {
            catalog_id: dto.id,
            title: dto.name,
            duration_ms: dto.duration_ms,
            track_number: dto.track_number,
            explicit: dto.explicit,
            album_catalog_id,
        }
    }
}
