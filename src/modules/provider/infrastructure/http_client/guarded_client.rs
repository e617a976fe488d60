//! HTTP client guarded by the provider's rate limiter and circuit breaker
//!
//! Every outbound provider call goes through here: acquire a token (bounded
//! by the acquire timeout), ask the breaker for permission, make the call
//! with the per-call timeout, classify the outcome into the shared error
//! taxonomy and feed the breaker. No retries at this layer.

use crate::modules::provider::Provider;
use crate::shared::config::ProviderLimits;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::circuit_breaker::CircuitBreaker;
use crate::shared::utils::rate_limiter::ProviderRateLimiter;
use crate::log_debug;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

pub struct GuardedClient {
    client: Client,
    limiter: Arc<ProviderRateLimiter>,
    breaker: Arc<CircuitBreaker>,
    acquire_timeout: Duration,
    provider: Provider,
}

impl GuardedClient {
    pub fn new(
        provider: Provider,
        limits: &ProviderLimits,
        limiter: Arc<ProviderRateLimiter>,
        breaker: Arc<CircuitBreaker>,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(limits.call_timeout)
            .user_agent("backline/0.1")
            .build()
            .map_err(|e| {
                AppError::ConfigError(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            limiter,
            breaker,
            acquire_timeout: limits.acquire_timeout,
            provider,
        })
    }

    /// GET a JSON resource. `headers` carries per-call auth (bearer token or
    /// API key); query parameters must already be encoded into `url`.
    pub async fn get_json<T>(&self, url: &str, headers: &[(String, String)]) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.limiter.acquire(self.acquire_timeout).await?;
        self.breaker.try_acquire()?;

        log_debug!("{} GET {}", self.provider, url);

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = AppError::from(e);
                if err.trips_breaker() {
                    self.breaker.record_failure();
                }
                return Err(err);
            }
        };

        let status = response.status();
        if let Err(err) = self.classify_status(status) {
            // A well-formed error response still proves the provider is up
            if err.trips_breaker() {
                self.breaker.record_failure();
            } else {
                self.breaker.record_success();
            }
            return Err(err);
        }

        self.breaker.record_success();
        self.parse_response(response).await
    }

    /// Map a non-success status into the error taxonomy.
    fn classify_status(&self, status: StatusCode) -> AppResult<()> {
        if status.is_success() {
            return Ok(());
        }
        Err(match status.as_u16() {
            404 => AppError::ProviderNotFound(format!("{}: HTTP 404", self.provider)),
            401 | 403 => AppError::Unauthorized(format!("{}: HTTP {}", self.provider, status)),
            429 => AppError::RateLimitTimeout(format!("{}: provider throttled (429)", self.provider)),
            500..=599 => {
                AppError::ProviderTransient(format!("{}: HTTP {}", self.provider, status))
            }
            _ => AppError::ValidationError(format!("{}: unexpected HTTP {}", self.provider, status)),
        })
    }

    async fn parse_response<T>(&self, response: reqwest::Response) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = response.text().await.map_err(|e| {
            AppError::SerializationError(format!(
                "failed to read {} response: {}",
                self.provider, e
            ))
        })?;

        serde_json::from_str(&body).map_err(|e| {
            AppError::SerializationError(format!(
                "failed to parse {} response: {}. Response: {}",
                self.provider,
                e,
                if body.len() > 200 {
                    format!("{}...", &body[..200])
                } else {
                    body
                }
            ))
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::utils::circuit_breaker::BreakerConfig;

    fn test_client() -> GuardedClient {
        let limits = ProviderLimits {
            permits: 10,
            period: Duration::from_secs(1),
            burst: 10,
            acquire_timeout: Duration::from_millis(100),
            call_timeout: Duration::from_secs(2),
        };
        GuardedClient::new(
            Provider::Catalog,
            &limits,
            Arc::new(ProviderRateLimiter::new("catalog", 10, Duration::from_secs(1), 10)),
            Arc::new(CircuitBreaker::new("catalog", BreakerConfig::default())),
        )
        .unwrap()
    }

    #[test]
    fn status_classification() {
        let client = test_client();
        assert!(client.classify_status(StatusCode::OK).is_ok());
        assert!(matches!(
            client.classify_status(StatusCode::NOT_FOUND),
            Err(AppError::ProviderNotFound(_))
        ));
        assert!(matches!(
            client.classify_status(StatusCode::BAD_GATEWAY),
            Err(AppError::ProviderTransient(_))
        ));
        assert!(matches!(
            client.classify_status(StatusCode::TOO_MANY_REQUESTS),
            Err(AppError::RateLimitTimeout(_))
        ));
        assert!(matches!(
            client.classify_status(StatusCode::BAD_REQUEST),
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn open_breaker_short_circuits_before_any_io() {
        let client = test_client();
        for _ in 0..BreakerConfig::default().failure_threshold {
            client.breaker.record_failure();
        }

        let result: AppResult<serde_json::Value> =
            client.get_json("http://127.0.0.1:1/none", &[]).await;
        assert!(matches!(result, Err(AppError::CircuitOpen(_))));
    }
}
