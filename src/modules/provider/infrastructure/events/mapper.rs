/// Maps events wire DTOs to domain shapes
use super::dto::{AttractionDto, EventDto, VenueDto};
use crate::modules::provider::domain::models::{Attraction, EventInfo, VenueInfo};
use chrono::{TimeZone, Utc};

pub struct EventsMapper;

impl EventsMapper {
    pub fn attraction(dto: AttractionDto) -> Attraction {
        let genres = dto
            .classifications
            .iter()
            .flat_map(|c| {
                c.genre
                    .iter()
                    .chain(c.sub_genre.iter())
                    .map(|n| n.name.clone())
            })
            .collect();

        Attraction {
            attraction_id: dto.id,
            name: dto.name,
            catalog_url: dto
                .external_links
                .and_then(|links| links.spotify.into_iter().next())
                .map(|link| link.url),
            image_url: dto.images.into_iter().next().map(|i| i.url),
            genres,
        }
    }

    pub fn venue(dto: VenueDto) -> VenueInfo {
        VenueInfo {
            venue_id: dto.id,
            name: dto.name,
            city: dto.city.and_then(|c| c.name),
            country: dto.country.and_then(|c| c.name),
        }
    }

    pub fn event(dto: EventDto) -> EventInfo {
        let starts_at = dto.dates.as_ref().and_then(|d| {
            let start = d.start.as_ref()?;
            start.date_time.or_else(|| {
                // Date-only events resolve to midnight UTC
                start
                    .local_date
                    .and_then(|date| Utc.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single())
            })
        });
        let status = dto
            .dates
            .as_ref()
            .and_then(|d| d.status.as_ref())
            .and_then(|s| s.code.clone());

        EventInfo {
            event_id: dto.id,
            name: dto.name,
            starts_at,
            status,
            url: dto.url,
            venue: dto
                .embedded
                .and_then(|e| e.venues.into_iter().next())
                .map(Self::venue),
        }
    }
}
