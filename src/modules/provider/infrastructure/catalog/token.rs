//! Client-credentials token exchange for the catalog provider
//!
//! Tokens are cached and refreshed ahead of expiry so workers never race an
//! expired token mid-stage.

use super::dto::TokenDto;
use crate::shared::errors::{AppError, AppResult};
use crate::log_debug;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Refresh this long before the provider-reported expiry.
const EXPIRY_BUFFER: Duration = Duration::from_secs(60);

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

pub struct TokenManager {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(token_url: &str, client_id: &str, client_secret: &str) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::ConfigError(format!("failed to create token client: {}", e)))?;

        Ok(Self {
            client,
            token_url: token_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            cached: Mutex::new(None),
        })
    }

    /// Current bearer token, exchanging credentials when the cache is empty
    /// or near expiry.
    pub async fn bearer(&self) -> AppResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() + EXPIRY_BUFFER < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        log_debug!("catalog token expired or missing, exchanging credentials");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(AppError::from)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AppError::Unauthorized(
                "catalog token exchange rejected".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(AppError::ProviderTransient(format!(
                "catalog token exchange failed: HTTP {}",
                status
            )));
        }

        let token: TokenDto = response.json().await.map_err(|e| {
            AppError::SerializationError(format!("failed to parse token response: {}", e))
        })?;

        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(access_token)
    }
}
