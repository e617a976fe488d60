/// Wire DTOs for the historical-setlist provider
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CityDto {
    pub name: Option<String>,
    pub country: Option<CountryDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryDto {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetlistVenueDto {
    pub id: String,
    pub name: String,
    pub city: Option<CityDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TourDto {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SongDto {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SetDto {
    #[serde(default)]
    pub song: Vec<SongDto>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SetsDto {
    #[serde(default)]
    pub set: Vec<SetDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetlistDto {
    pub id: String,
    /// dd-MM-yyyy
    pub event_date: Option<String>,
    pub venue: Option<SetlistVenueDto>,
    pub tour: Option<TourDto>,
    pub sets: Option<SetsDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetlistResponseDto {
    #[serde(default)]
    pub setlist: Vec<SetlistDto>,
    pub page: Option<i32>,
    pub total: Option<i32>,
    pub items_per_page: Option<i32>,
}
