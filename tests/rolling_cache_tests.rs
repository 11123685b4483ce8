//! Integration Tests for the Rolling Cache
//!
//! Runs the HTTP fetcher, registry and proxy router against a local upstream
//! server whose failures can be scripted.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    routing::get,
    Router,
};
use rolling_cache::{
    api::create_router, AppState, CacheError, Config, FetchError, Fetcher, HttpFetcher,
    MaxRetries, Options, Registry,
};
use tower::ServiceExt;

// == Helper Functions ==

#[derive(Clone)]
struct Upstream {
    hits: Arc<AtomicUsize>,
    fail_first: usize,
}

async fn flaky_handler(State(upstream): State<Upstream>) -> (StatusCode, String) {
    let hit = upstream.hits.fetch_add(1, Ordering::SeqCst) + 1;
    if hit <= upstream.fail_first {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    } else {
        (StatusCode::OK, format!("It works: {hit}"))
    }
}

async fn agent_handler(headers: HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Starts an upstream that answers 500 to its first `fail_first` requests.
async fn spawn_upstream(fail_first: usize) -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/", get(flaky_handler))
        .route("/agent", get(agent_handler))
        .with_state(Upstream {
            hits: hits.clone(),
            fail_first,
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, hits)
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::with_timeout(Duration::from_secs(5)).unwrap()
}

// == Fetcher Tests ==

#[tokio::test]
async fn test_http_fetcher_returns_body() {
    let (addr, hits) = spawn_upstream(0).await;

    let body = fetcher().fetch(&format!("http://{addr}/")).await.unwrap();

    assert_eq!(body, "It works: 1");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_http_fetcher_rejects_server_error() {
    let (addr, _) = spawn_upstream(1).await;

    let result = fetcher().fetch(&format!("http://{addr}/")).await;

    assert!(matches!(
        result,
        Err(FetchError::Status(status)) if status == StatusCode::INTERNAL_SERVER_ERROR
    ));
}

#[tokio::test]
async fn test_http_fetcher_rejects_not_found() {
    let (addr, _) = spawn_upstream(0).await;

    let result = fetcher().fetch(&format!("http://{addr}/missing")).await;

    assert!(matches!(
        result,
        Err(FetchError::Status(status)) if status == StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
async fn test_http_fetcher_sends_shared_headers() {
    let (addr, _) = spawn_upstream(0).await;
    let fetcher = fetcher();
    fetcher
        .set_header("User-Agent", "rolling cache test")
        .await
        .unwrap();

    let body = fetcher.fetch(&format!("http://{addr}/agent")).await.unwrap();

    assert_eq!(body, "rolling cache test");
}

// == Registry Tests ==

#[tokio::test]
async fn test_registry_retries_within_cycle() {
    let (addr, hits) = spawn_upstream(3).await;
    let registry = Registry::new(Arc::new(fetcher()));

    let options = Options::new(Duration::from_secs(10)).with_max_retries(MaxRetries::Limited(3));
    let payload = registry
        .get_with_options(&format!("http://{addr}/"), options)
        .await
        .unwrap();

    assert_eq!(payload, "It works: 4");
    assert_eq!(hits.load(Ordering::SeqCst), 4);
    assert_eq!(registry.count().await, 1);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_registry_times_out_on_failing_upstream() {
    let (addr, _) = spawn_upstream(usize::MAX).await;
    let registry = Registry::new(Arc::new(fetcher()));
    let url = format!("http://{addr}/");

    let options = Options::new(Duration::from_secs(10))
        .with_fail_interval(Duration::from_millis(50))
        .with_max_retries(MaxRetries::Limited(0));
    let result = registry
        .get_with_options_timeout(&url, options, Some(Duration::from_millis(300)))
        .await;

    assert!(matches!(result, Err(CacheError::Timeout(_))));
    let entry = registry.lookup(&url).await.unwrap();
    assert!(!entry.is_available());
    assert!(!entry.last_success());
    assert!(registry.stats().await.cycles_failed >= 1);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_registry_get_uses_rolling_lifetime() {
    let (addr, _) = spawn_upstream(0).await;
    let registry = Registry::new(Arc::new(fetcher()));
    let url = format!("http://{addr}/");

    registry.get(&url, Duration::from_secs(2)).await.unwrap();

    let entry = registry.lookup(&url).await.unwrap();
    assert_eq!(entry.options().lifetime, Duration::from_secs(20));

    registry.shutdown().await;
}

// == Proxy Tests ==

#[tokio::test]
async fn test_proxy_fetch_through() {
    let (addr, hits) = spawn_upstream(0).await;
    let registry = Registry::new(Arc::new(fetcher()));
    let app = create_router(AppState::new(registry.clone(), Config::default()));

    let uri = format!("/fetch?url=http%3A%2F%2F{addr}%2F&interval_secs=60");
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, "It works: 1");
    }

    // All three reads were served from the same cached payload
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(registry.count().await, 1);

    let response = app
        .oneshot(Request::builder().uri("/entries").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["count"], 1);
    assert_eq!(json["entries"][0]["available"], true);

    registry.shutdown().await;
}
