pub mod catalog;
pub mod health;
pub mod mutation;
pub mod stream;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::json;

use anibase_core::error::CoreError;
use anibase_store::CatalogStore;

use crate::state::AppState;

/// Build the full route tree.
///
/// ```text
/// GET   /health            liveness + backend probe
/// GET   /movies            list movies        (?limit, ?skip)
/// GET   /series            list series        (?limit, ?skip)
/// GET   /latest            list all, newest first
/// GET   /getdetails        one record         (?id)
/// GET   /stream            resolve links      (?id, ?season, ?episode|bolum)
/// POST  /addanime          create (201)
/// PATCH /editanime/{id}    sparse update
/// PATCH /addlink/{id}      targeted link append
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(catalog::router())
        .merge(stream::router())
        .merge(mutation::router())
        .fallback(not_found)
}

/// Global fallback so unmatched routes share the `{"detail"}` error shape.
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found" })))
}

/// Reject ids the active backend considers malformed before any lookup, so
/// a bad id is always a 400 and never a 404.
pub(crate) fn ensure_valid_id(store: &dyn CatalogStore, id: &str) -> Result<(), CoreError> {
    if store.is_valid_id(id) {
        Ok(())
    } else {
        Err(CoreError::InvalidId)
    }
}
