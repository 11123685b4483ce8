//! Request DTOs for the rolling cache proxy API
//!
//! Defines the query parameters accepted by the fetch endpoint.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

/// Query string for the fetch-through operation (GET /fetch)
///
/// # Fields
/// - `url`: The resource to cache
/// - `interval_secs`: Refresh interval for a new entry (uses default if not specified)
/// - `timeout_ms`: How long to wait for the first data, 0 waits forever
#[derive(Debug, Clone, Deserialize)]
pub struct FetchQuery {
    /// The resource identifier
    pub url: String,
    /// Optional refresh interval in seconds
    #[serde(default)]
    pub interval_secs: Option<u64>,
    /// Optional read timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl FetchQuery {
    /// Validates the query
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.url.is_empty() {
            return Some("url cannot be empty".to_string());
        }
        match Url::parse(&self.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => None,
            Ok(url) => Some(format!("unsupported url scheme '{}'", url.scheme())),
            Err(e) => Some(format!("invalid url: {e}")),
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs.map(Duration::from_secs)
    }

    /// Requested read timeout: `Some(None)` waits forever, `None` uses the default.
    pub fn timeout(&self) -> Option<Option<Duration>> {
        self.timeout_ms.map(|ms| match ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        })
    }
}
