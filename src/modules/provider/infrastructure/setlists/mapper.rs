/// Maps setlist wire DTOs to domain shapes
use super::dto::{SetlistDto, SetlistResponseDto};
use crate::modules::provider::domain::models::{Setlist, SetlistPage, VenueInfo};
use chrono::NaiveDate;

pub struct SetlistMapper;

impl SetlistMapper {
    pub fn setlist(dto: SetlistDto) -> Setlist {
        let event_date = dto
            .event_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%d-%m-%Y").ok());

        let venue = dto.venue.map(|v| {
            let city = v.city.as_ref().and_then(|c| c.name.clone());
            let country = v
                .city
                .and_then(|c| c.country)
                .and_then(|country| country.name);
            VenueInfo {
                venue_id: v.id,
                name: v.name,
                city,
                country,
            }
        });

        let song_titles = dto
            .sets
            .unwrap_or_default()
            .set
            .into_iter()
            .flat_map(|set| set.song.into_iter().map(|s| s.name))
            .collect();

        Setlist {
            setlist_id: dto.id,
            event_date,
            venue,
            tour: dto.tour.and_then(|t| t.name),
            song_titles,
        }
    }

    pub fn page(dto: SetlistResponseDto) -> SetlistPage {
        let page = dto.page.unwrap_or(1);
        let total_pages = match (dto.total, dto.items_per_page) {
            (Some(total), Some(per_page)) if per_page > 0 => {
                (total + per_page - 1) / per_page
            }
            _ => page,
        };

        SetlistPage {
            items: dto.setlist.into_iter().map(Self::setlist).collect(),
            page,
            total_pages,
        }
    }
}
