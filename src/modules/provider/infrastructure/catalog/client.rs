/// HTTP adapter for the profile/catalog provider
///
/// Client-credentials auth, offset pagination on listings. All calls go
/// through the guarded client; failures surface in the shared taxonomy and
/// are never retried here.
use super::dto::{AlbumDto, CatalogArtistDto, PagingDto, SearchArtistsDto, TopTracksDto, TrackDto};
use super::mapper::CatalogMapper;
use super::token::TokenManager;
use crate::modules::provider::domain::models::{AlbumSummary, ArtistProfile, TrackInfo};
use crate::modules::provider::domain::ports::CatalogProvider;
use crate::modules::provider::infrastructure::http_client::GuardedClient;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// Page size for album and track listings (the provider's maximum).
const PAGE_LIMIT: usize = 50;
/// Hard cap on pagination, guards against a provider returning endless
/// `next` links.
const MAX_PAGES: usize = 40;

pub struct CatalogClient {
    guarded: GuardedClient,
    tokens: TokenManager,
    base_url: String,
}

impl CatalogClient {
    pub fn new(guarded: GuardedClient, tokens: TokenManager, base_url: &str) -> Self {
        Self {
            guarded,
            tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn auth_headers(&self) -> AppResult<Vec<(String, String)>> {
        let token = self.tokens.bearer().await?;
        Ok(vec![(
            "Authorization".to_string(),
            format!("Bearer {}", token),
        )])
    }

    /// Follow `next` links until the listing is exhausted.
    async fn collect_pages<T>(&self, first_url: String) -> AppResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let headers = self.auth_headers().await?;
        let mut items = Vec::new();
        let mut url = Some(first_url);
        let mut pages = 0;

        while let Some(current) = url {
            if pages >= MAX_PAGES {
                break;
            }
            let page: PagingDto<T> = self.guarded.get_json(&current, &headers).await?;
            items.extend(page.items);
            url = page.next;
            pages += 1;
        }

        Ok(items)
    }
}

#[async_trait]
impl CatalogProvider for CatalogClient {
    async fn get_artist(&self, catalog_id: &str) -> AppResult<ArtistProfile> {
        let headers = self.auth_headers().await?;
        let url = format!("{}/artists/{}", self.base_url, catalog_id);
        let dto: CatalogArtistDto = self.guarded.get_json(&url, &headers).await?;
        Ok(CatalogMapper::profile(dto))
    }

    async fn search_artist(&self, name: &str) -> AppResult<Option<ArtistProfile>> {
        let headers = self.auth_headers().await?;
        let url = format!(
            "{}/search?type=artist&limit=1&q={}",
            self.base_url,
            urlencoding::encode(name)
        );
        let dto: SearchArtistsDto = self.guarded.get_json(&url, &headers).await?;
        Ok(dto
            .artists
            .items
            .into_iter()
            .next()
            .map(CatalogMapper::profile))
    }

    async fn list_albums(
        &self,
        artist_catalog_id: &str,
        include_groups: &[String],
    ) -> AppResult<Vec<AlbumSummary>> {
        let url = format!(
            "{}/artists/{}/albums?limit={}&include_groups={}",
            self.base_url,
            artist_catalog_id,
            PAGE_LIMIT,
            urlencoding::encode(&include_groups.join(","))
        );
        let dtos: Vec<AlbumDto> = self.collect_pages(url).await?;
        Ok(dtos.into_iter().map(CatalogMapper::album).collect())
    }

    async fn list_album_tracks(&self, album_catalog_id: &str) -> AppResult<Vec<TrackInfo>> {
        let url = format!(
            "{}/albums/{}/tracks?limit={}",
            self.base_url, album_catalog_id, PAGE_LIMIT
        );
        let dtos: Vec<TrackDto> = self.collect_pages(url).await?;
        Ok(dtos
            .into_iter()
            .map(|dto| CatalogMapper::track(dto, Some(album_catalog_id.to_string())))
            .collect())
    }

    async fn top_tracks(&self, artist_catalog_id: &str) -> AppResult<Vec<TrackInfo>> {
        let headers = self.auth_headers().await?;
        let url = format!("{}/artists/{}/top-tracks", self.base_url, artist_catalog_id);
        let dto: TopTracksDto = self.guarded.get_json(&url, &headers).await?;
        Ok(dto
            .tracks
            .into_iter()
            .map(|t| CatalogMapper::track(t, None))
            .collect())
    }
}
