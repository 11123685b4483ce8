//! Fetcher Module
//!
//! The collaborator that performs one request for an identifier, plus the
//! default reqwest-backed implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{CacheError, FetchError, Result};

/// Default user agent sent by [`HttpFetcher`].
pub const DEFAULT_USER_AGENT: &str = concat!("rolling_cache/", env!("CARGO_PKG_VERSION"));

// == Fetcher Trait ==
/// Performs a single fetch of the resource behind an identifier.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, identifier: &str) -> std::result::Result<Bytes, FetchError>;
}

// == HTTP Fetcher ==
/// Fetches identifiers as URLs with a GET request.
///
/// Request headers are shared by every clone of the fetcher and may be
/// changed at runtime, although they are normally configured once at startup.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    headers: Arc<RwLock<HeaderMap>>,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        Self {
            client,
            headers: Arc::new(RwLock::new(headers)),
        }
    }

    /// Builds a fetcher whose client gives up on requests after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(client))
    }

    /// Sets a header sent with every subsequent request, replacing any
    /// previous value.
    pub async fn set_header(&self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| CacheError::Configuration(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| CacheError::Configuration(format!("invalid header value: {e}")))?;
        self.headers.write().await.insert(name, value);
        Ok(())
    }

    pub async fn headers(&self) -> HeaderMap {
        self.headers.read().await.clone()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, identifier: &str) -> std::result::Result<Bytes, FetchError> {
        let headers = self.headers.read().await.clone();

        debug!("Fetching rolling cache resource `{}`", identifier);
        let response = self
            .client
            .get(identifier)
            .headers(headers)
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response.bytes().await.map_err(FetchError::Body)
    }
}
