//! Error types for the rolling cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Errors surfaced to callers of the registry and reader API.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Entry options are unusable (e.g. zero refresh interval)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No payload became available before the deadline
    #[error("Timed out after {0:?} waiting for rolling cache data")]
    Timeout(Duration),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == Fetch Error Enum ==
/// Failure of a single fetch attempt.
///
/// Only the refresh loop sees these; readers observe them indirectly through
/// `last_success`.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or no response arrived
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The server answered outside of the 2xx range
    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),

    /// The response body could not be read
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// Failure reported by a non-HTTP fetcher
    #[error("{0}")]
    Other(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Configuration(_) => StatusCode::BAD_REQUEST,
            CacheError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the rolling cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let response = CacheError::Timeout(Duration::from_millis(50)).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_configuration_maps_to_bad_request() {
        let response = CacheError::Configuration("interval".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "unexpected status: 500 Internal Server Error");
    }
}
