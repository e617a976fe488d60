/// HTTP adapter for the events/venues provider
///
/// Static API key auth passed as a query parameter, the provider's
/// convention. Venue details arrive embedded in event responses.
use super::dto::{AttractionDto, EventsResponseDto};
use super::mapper::EventsMapper;
use crate::modules::provider::domain::models::{Attraction, EventInfo};
use crate::modules::provider::domain::ports::EventsProvider;
use crate::modules::provider::infrastructure::http_client::GuardedClient;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// Events fetched per search; one page is plenty for near-term shows.
const EVENT_PAGE_SIZE: usize = 100;

pub struct EventsClient {
    guarded: GuardedClient,
    base_url: String,
    api_key: String,
}

impl EventsClient {
    pub fn new(guarded: GuardedClient, base_url: &str, api_key: &str) -> Self {
        Self {
            guarded,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl EventsProvider for EventsClient {
    async fn get_attraction(&self, attraction_id: &str) -> AppResult<Attraction> {
        let url = format!(
            "{}/attractions/{}.json?apikey={}",
            self.base_url,
            urlencoding::encode(attraction_id),
            self.api_key
        );
        let dto: AttractionDto = self.guarded.get_json(&url, &[]).await?;
        Ok(EventsMapper::attraction(dto))
    }

    async fn search_events(&self, attraction_id: &str) -> AppResult<Vec<EventInfo>> {
        let url = format!(
            "{}/events.json?attractionId={}&size={}&sort=date,asc&apikey={}",
            self.base_url,
            urlencoding::encode(attraction_id),
            EVENT_PAGE_SIZE,
            self.api_key
        );
        let dto: EventsResponseDto = self.guarded.get_json(&url, &[]).await?;
        Ok(dto
            .embedded
            .unwrap_or_default()
            .events
            .into_iter()
            .map(EventsMapper::event)
            .collect())
    }
}
