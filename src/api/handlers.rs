//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::{HttpFetcher, Registry};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{EntriesResponse, FetchQuery, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Rolling cache registry
    pub registry: Registry,
    /// Defaults for entries created through the API
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState around an existing registry.
    pub fn new(registry: Registry, config: Config) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds an HTTP fetcher with the configured request timeout and user
    /// agent, and a registry on top of it.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::with_timeout(Duration::from_secs(config.request_timeout))?;
        fetcher.set_header("User-Agent", &config.user_agent).await?;
        let registry = Registry::new(Arc::new(fetcher));
        Ok(Self::new(registry, config.clone()))
    }
}

/// Handler for GET /fetch
///
/// Returns the latest payload for `url`, starting a rolling cache for it on
/// first use. Waits for the first successful fetch up to the requested (or
/// configured) timeout.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Query(query): Query<FetchQuery>,
) -> Result<Response> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let options = match query.interval() {
        Some(interval) => state.config.options_for(interval),
        None => state.config.default_options(),
    };
    let timeout = query
        .timeout()
        .unwrap_or_else(|| state.config.read_timeout());

    let payload = state
        .registry
        .get_with_options_timeout(&query.url, options, timeout)
        .await?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], payload).into_response())
}

/// Handler for GET /entries
///
/// Lists the rolling caches that are currently alive.
pub async fn entries_handler(State(state): State<AppState>) -> Json<EntriesResponse> {
    Json(EntriesResponse::new(state.registry.entries().await))
}

/// Handler for GET /stats
///
/// Returns current registry statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.registry.stats().await))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
