//! Error types for the ESI client.

use market_scan_core::FetchError;
use thiserror::Error;

/// Errors that can occur when talking to ESI.
#[derive(Debug, Error)]
pub enum EsiError {
    /// API request failed.
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Error message from API.
        message: String,
    },

    /// Rate limit or error limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimit {
        /// Seconds to wait before retry.
        retry_after_secs: u64,
    },

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Response body could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Client could not be constructed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl EsiError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a rate limit error.
    pub fn rate_limit(retry_after_secs: u64) -> Self {
        Self::RateLimit { retry_after_secs }
    }
}

impl From<reqwest::Error> for EsiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Serialization(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EsiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<EsiError> for FetchError {
    fn from(err: EsiError) -> Self {
        match err {
            EsiError::Api {
                status_code,
                message,
            } => Self::Api {
                status_code,
                message,
            },
            EsiError::RateLimit { retry_after_secs } => Self::RateLimit { retry_after_secs },
            EsiError::Network(msg) | EsiError::Configuration(msg) => Self::Network(msg),
            EsiError::Timeout(msg) => Self::Timeout(msg),
            EsiError::Serialization(msg) => Self::Decode(msg),
        }
    }
}

/// Result type alias for ESI operations.
pub type Result<T> = std::result::Result<T, EsiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_construction() {
        let err = EsiError::api(404, "Type not found");
        assert!(matches!(
            err,
            EsiError::Api {
                status_code: 404,
                ..
            }
        ));
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("Type not found"));
    }

    #[test]
    fn test_rate_limit_maps_to_fetch_error() {
        let fetch: FetchError = EsiError::rate_limit(30).into();
        assert_eq!(
            fetch,
            FetchError::RateLimit {
                retry_after_secs: 30
            }
        );
    }

    #[test]
    fn test_serialization_maps_to_decode() {
        let fetch: FetchError = EsiError::Serialization("expected array".to_string()).into();
        assert!(matches!(fetch, FetchError::Decode(_)));
        assert!(!fetch.is_transient());
    }

    #[test]
    fn test_server_error_stays_transient() {
        let fetch: FetchError = EsiError::api(502, "bad gateway").into();
        assert!(fetch.is_transient());
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let err: EsiError = serde_err.into();
        assert!(matches!(err, EsiError::Serialization(_)));
    }
}
