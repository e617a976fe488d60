use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("Rate limit timeout: {0}")]
    RateLimitTimeout(String),

    #[error("Circuit open: {0}")]
    CircuitOpen(String),

    #[error("Provider resource not found: {0}")]
    ProviderNotFound(String),

    #[error("Provider transient error: {0}")]
    ProviderTransient(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store conflict: {0}")]
    StoreConflict(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    /// Whether a failed job carrying this error should be retried.
    ///
    /// Circuit-open errors are retryable: the backoff delay naturally waits
    /// out the breaker cooldown. Validation and not-found are permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::RateLimitTimeout(_)
                | AppError::CircuitOpen(_)
                | AppError::ProviderTransient(_)
                | AppError::StoreError(_)
        )
    }

    /// Whether this error counts toward a provider circuit breaker trip.
    ///
    /// Only transport-level failures do; a 404 or a malformed payload says
    /// nothing about provider availability.
    pub fn trips_breaker(&self) -> bool {
        matches!(self, AppError::ProviderTransient(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::ProviderTransient("request timeout".to_string())
        } else if err.is_connect() {
            AppError::ProviderTransient("failed to connect to provider".to_string())
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                404 => AppError::ProviderNotFound("provider resource not found".to_string()),
                401 | 403 => {
                    AppError::Unauthorized("not authorized against provider".to_string())
                }
                429 => AppError::RateLimitTimeout("provider returned 429".to_string()),
                500..=599 => AppError::ProviderTransient(format!("HTTP {}: {}", status, err)),
                _ => AppError::ValidationError(format!("HTTP {}: {}", status, err)),
            }
        } else {
            AppError::ProviderTransient(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::ValidationError(format!("Invalid UUID: {}", err))
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::ValidationError(format!("Invalid date/time: {}", err))
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(AppError::RateLimitTimeout("t".into()).is_retryable());
        assert!(AppError::CircuitOpen("t".into()).is_retryable());
        assert!(AppError::ProviderTransient("t".into()).is_retryable());
        assert!(!AppError::ProviderNotFound("t".into()).is_retryable());
        assert!(!AppError::ValidationError("t".into()).is_retryable());
        assert!(!AppError::StoreConflict("t".into()).is_retryable());
    }

    #[test]
    fn breaker_classification() {
        assert!(AppError::ProviderTransient("t".into()).trips_breaker());
        assert!(!AppError::ProviderNotFound("t".into()).trips_breaker());
        assert!(!AppError::ValidationError("t".into()).trips_breaker());
        assert!(!AppError::CircuitOpen("t".into()).trips_breaker());
    }
}
