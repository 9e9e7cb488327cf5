//! Error types shared across the scanner crates.
//!
//! `FetchError` is what every `MarketDataClient` implementation reports;
//! `ConfigError` is raised when a `ScanConfig` fails validation.

use rust_decimal::Decimal;
use thiserror::Error;

/// A remote market-data lookup failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Non-success HTTP status.
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Response body or reason.
        message: String,
    },

    /// Upstream asked us to back off.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimit {
        /// Seconds to wait before retry.
        retry_after_secs: u64,
    },

    /// Payload could not be decoded.
    #[error("malformed payload: {0}")]
    Decode(String),
}

impl FetchError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Returns true if the error indicates the request could succeed later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimit { .. } => true,
            Self::Api { status_code, .. } => *status_code >= 500,
            Self::Decode(_) => false,
        }
    }
}

/// A `ScanConfig` value is out of its allowed range.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A threshold that must be non-negative was negative.
    #[error("{field} must be non-negative, got {value}")]
    Negative {
        /// Offending field name.
        field: &'static str,
        /// Supplied value.
        value: Decimal,
    },

    /// A percentage fell outside `[0, 100]`.
    #[error("{field} must be between 0 and 100, got {value}")]
    PercentOutOfRange {
        /// Offending field name.
        field: &'static str,
        /// Supplied value.
        value: Decimal,
    },

    /// Worker limit of zero would never make progress.
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}
