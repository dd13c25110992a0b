//! Shared helpers for API integration tests.
//!
//! Mirrors the production router construction in `router.rs` so tests
//! exercise the same middleware stack (CORS, request ID, timeout, tracing,
//! panic recovery) the binary uses, backed by the in-memory store. Requests
//! are driven through `tower::ServiceExt::oneshot` without a TCP listener.

#![allow(dead_code)] // not every test file uses every helper

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use anibase_api::config::ServerConfig;
use anibase_api::router::build_app_router;
use anibase_api::state::AppState;
use anibase_store::memory::MemoryStore;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router backed by a fresh in-memory store.
///
/// Clone the returned router per request; the store behind it is shared, so
/// state persists across requests within one test.
pub fn build_test_app() -> Router {
    let config = test_config();
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Send a GET request to the router.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a PATCH request with a JSON body.
pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("PATCH")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a movie through the API, returning the stored record.
pub async fn create_movie(app: &Router, title: &str) -> serde_json::Value {
    let response = post_json(
        app.clone(),
        "/addanime",
        serde_json::json!({
            "title": title,
            "type": "movie",
            "movie_stream_links": []
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Create a two-season series through the API, returning the stored record.
///
/// Season 1 has episodes 1 and 2; episode 2 carries one 720p link. Season 2
/// has episode 1.
pub async fn create_series(app: &Router, title: &str) -> serde_json::Value {
    let response = post_json(
        app.clone(),
        "/addanime",
        serde_json::json!({
            "title": title,
            "type": "series",
            "seasons": [
                {
                    "season": 1,
                    "episodes": [
                        {"number": 1},
                        {"number": 2, "stream_links": [{"label": "720p", "url": "https://x/a"}]}
                    ]
                },
                {
                    "season": 2,
                    "episodes": [{"number": 1}]
                }
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}
