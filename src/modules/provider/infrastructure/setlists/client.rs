/// HTTP adapter for the historical-setlist provider
///
/// Static API key in a header. The provider's rate limit is strict, so the
/// matching limiter is configured low and the setlist queue itself is capped.
use super::dto::SetlistResponseDto;
use super::mapper::SetlistMapper;
use crate::modules::provider::domain::models::SetlistPage;
use crate::modules::provider::domain::ports::SetlistProvider;
use crate::modules::provider::infrastructure::http_client::GuardedClient;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

pub struct SetlistClient {
    guarded: GuardedClient,
    base_url: String,
    api_key: String,
}

impl SetlistClient {
    pub fn new(guarded: GuardedClient, base_url: &str, api_key: &str) -> Self {
        Self {
            guarded,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl SetlistProvider for SetlistClient {
    async fn search_setlists(&self, artist_name: &str, page: i32) -> AppResult<SetlistPage> {
        let url = format!(
            "{}/search/setlists?artistName={}&p={}",
            self.base_url,
            urlencoding::encode(artist_name),
            page.max(1)
        );
        let headers = vec![
            ("x-api-key".to_string(), self.api_key.clone()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        let dto: SetlistResponseDto = self.guarded.get_json(&url, &headers).await?;
        Ok(SetlistMapper::page(dto))
    }
}
