//! API error taxonomy.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// One attempt exceeded the per-call deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered outside 2xx.
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// The body was not the JSON shape we expect.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The server answered `success: false`. A definitive answer; never
    /// retried.
    #[error("rejected by server: {0}")]
    Rejected(String),

    /// Input failed client-side validation; no call was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The retry budget is spent.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<ApiError> },
}

impl ApiError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_) | ApiError::Timeout(_) | ApiError::Http { .. } | ApiError::Decode(_)
        )
    }
}

impl From<gripdash_core::CoreError> for ApiError {
    fn from(err: gripdash_core::CoreError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability() {
        assert!(ApiError::Network("refused".into()).is_retryable());
        assert!(ApiError::Timeout(Duration::from_secs(10)).is_retryable());
        assert!(ApiError::Http { status: 502 }.is_retryable());
        assert!(ApiError::Decode("not json".into()).is_retryable());

        assert!(!ApiError::Rejected("Modbus未连接".into()).is_retryable());
        assert!(!ApiError::Validation("out of range".into()).is_retryable());
    }
}
