/// Wire DTOs for the events/venues provider
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ImageDto {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLinkDto {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLinksDto {
    #[serde(default)]
    pub spotify: Vec<ExternalLinkDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationDto {
    pub genre: Option<NamedDto>,
    pub sub_genre: Option<NamedDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedDto {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttractionDto {
    pub id: String,
    pub name: String,
    pub external_links: Option<ExternalLinksDto>,
    #[serde(default)]
    pub classifications: Vec<ClassificationDto>,
    #[serde(default)]
    pub images: Vec<ImageDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDto {
    pub date_time: Option<DateTime<Utc>>,
    pub local_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusDto {
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatesDto {
    pub start: Option<StartDto>,
    pub status: Option<StatusDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityDto {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryDto {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VenueDto {
    pub id: String,
    pub name: String,
    pub city: Option<CityDto>,
    pub country: Option<CountryDto>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EventEmbeddedDto {
    #[serde(default)]
    pub venues: Vec<VenueDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDto {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub dates: Option<DatesDto>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<EventEmbeddedDto>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EventsEmbeddedDto {
    #[serde(default)]
    pub events: Vec<EventDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponseDto {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EventsEmbeddedDto>,
}
