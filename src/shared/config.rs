//! Pipeline configuration.
//!
//! Every tuning knob (retry, breaker, rate quotas, concurrency, retention)
//! lives here with coded defaults, overridable through the environment.
//! Call sites never hardcode these numbers.

use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::circuit_breaker::BreakerConfig;
use std::time::Duration;

/// Job retry policy applied by the job store on failure.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts before a job is failed permanently.
    pub max_attempts: i32,
    /// Base delay for exponential backoff (base * 2^(attempt-1)).
    pub base_delay: Duration,
    /// Cap on the computed backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(120),
        }
    }
}

/// Token-bucket quota and call bounds for one provider.
#[derive(Debug, Clone)]
pub struct ProviderLimits {
    /// Tokens replenished per `period`.
    pub permits: u32,
    pub period: Duration,
    /// Bucket capacity for bursts.
    pub burst: u32,
    /// How long a worker may wait on a token before `RateLimitTimeout`.
    pub acquire_timeout: Duration,
    /// Per-call HTTP timeout.
    pub call_timeout: Duration,
}

/// Worker pool sizing for one named queue.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub concurrency: usize,
    pub poll_interval: Duration,
    /// Lease held by a worker; expired leases make the job eligible again.
    pub lease_duration: Duration,
    /// Optional queue-wide throughput cap (permits, period), shared by all
    /// workers of the queue and distinct from per-provider limiters.
    pub throughput: Option<(u32, Duration)>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: 2,
            poll_interval: Duration::from_millis(200),
            lease_duration: Duration::from_secs(60),
            throughput: None,
        }
    }
}

/// Credentials and base URLs for the three external providers.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub catalog_base_url: String,
    pub catalog_token_url: String,
    pub catalog_client_id: String,
    pub catalog_client_secret: String,
    pub events_base_url: String,
    pub events_api_key: String,
    pub setlist_base_url: String,
    pub setlist_api_key: String,
}

/// Full pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub retry: RetryConfig,
    pub breaker: BreakerConfig,

    pub catalog_limits: ProviderLimits,
    pub events_limits: ProviderLimits,
    pub setlist_limits: ProviderLimits,

    pub profile_queue: QueueConfig,
    pub catalog_queue: QueueConfig,
    pub event_queue: QueueConfig,
    pub setlist_queue: QueueConfig,

    /// Delay before the exhaustive deep-catalog pass, so the fast path
    /// (top tracks, near-term shows) lands first.
    pub deep_catalog_delay: Duration,

    /// How long completed jobs are retained before purge.
    pub completed_retention: Duration,
    /// Failed jobs are kept longer for inspection.
    pub failed_retention: Duration,

    pub endpoints: ProviderEndpoints,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            breaker: BreakerConfig::default(),
            catalog_limits: ProviderLimits {
                permits: 30,
                period: Duration::from_secs(1),
                burst: 30,
                acquire_timeout: Duration::from_secs(10),
                call_timeout: Duration::from_secs(15),
            },
            events_limits: ProviderLimits {
                permits: 20,
                period: Duration::from_secs(1),
                burst: 20,
                acquire_timeout: Duration::from_secs(10),
                call_timeout: Duration::from_secs(15),
            },
            setlist_limits: ProviderLimits {
                permits: 10,
                period: Duration::from_secs(60),
                burst: 2,
                acquire_timeout: Duration::from_secs(30),
                call_timeout: Duration::from_secs(20),
            },
            profile_queue: QueueConfig {
                concurrency: 2,
                ..QueueConfig::default()
            },
            catalog_queue: QueueConfig {
                concurrency: 4,
                ..QueueConfig::default()
            },
            event_queue: QueueConfig {
                concurrency: 2,
                ..QueueConfig::default()
            },
            setlist_queue: QueueConfig {
                concurrency: 1,
                // Keep the whole queue under the provider's strict limit
                throughput: Some((10, Duration::from_secs(60))),
                ..QueueConfig::default()
            },
            deep_catalog_delay: Duration::from_secs(5),
            completed_retention: Duration::from_secs(60 * 60),
            failed_retention: Duration::from_secs(7 * 24 * 60 * 60),
            endpoints: ProviderEndpoints {
                catalog_base_url: "https://api.catalog.example/v1".to_string(),
                catalog_token_url: "https://auth.catalog.example/api/token".to_string(),
                catalog_client_id: String::new(),
                catalog_client_secret: String::new(),
                events_base_url: "https://api.events.example/discovery/v2".to_string(),
                events_api_key: String::new(),
                setlist_base_url: "https://api.setlists.example/rest/1.0".to_string(),
                setlist_api_key: String::new(),
            },
        }
    }
}

impl PipelineConfig {
    /// Build from environment variables over the coded defaults.
    ///
    /// Loads `.env` first (ignored when absent), then applies any
    /// `BACKLINE_*` overrides.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Some(n) = read_parsed::<i32>("BACKLINE_MAX_ATTEMPTS")? {
            if n < 1 {
                return Err(AppError::ConfigError(
                    "BACKLINE_MAX_ATTEMPTS must be >= 1".to_string(),
                ));
            }
            config.retry.max_attempts = n;
        }
        if let Some(ms) = read_parsed::<u64>("BACKLINE_RETRY_BASE_DELAY_MS")? {
            config.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_parsed::<u64>("BACKLINE_RETRY_MAX_DELAY_MS")? {
            config.retry.max_delay = Duration::from_millis(ms);
        }
        if let Some(n) = read_parsed::<u32>("BACKLINE_BREAKER_THRESHOLD")? {
            config.breaker.failure_threshold = n;
        }
        if let Some(ms) = read_parsed::<u64>("BACKLINE_BREAKER_COOLDOWN_MS")? {
            config.breaker.cooldown = Duration::from_millis(ms);
        }

        if let Ok(v) = std::env::var("BACKLINE_CATALOG_CLIENT_ID") {
            config.endpoints.catalog_client_id = v;
        }
        if let Ok(v) = std::env::var("BACKLINE_CATALOG_CLIENT_SECRET") {
            config.endpoints.catalog_client_secret = v;
        }
        if let Ok(v) = std::env::var("BACKLINE_EVENTS_API_KEY") {
            config.endpoints.events_api_key = v;
        }
        if let Ok(v) = std::env::var("BACKLINE_SETLIST_API_KEY") {
            config.endpoints.setlist_api_key = v;
        }

        Ok(config)
    }
}

/// Parse an optional environment variable, erroring on malformed values.
fn read_parsed<T: std::str::FromStr>(key: &str) -> AppResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::ConfigError(format!("{} has invalid value '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = PipelineConfig::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.catalog_limits.permits > config.setlist_limits.permits);
        assert_eq!(config.setlist_queue.concurrency, 1);
        assert!(config.failed_retention > config.completed_retention);
    }
}
