use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use anibase_core::types::Timestamp;
use anibase_store::CatalogStore;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Whether the catalog backend answered the probe.
    pub ok: bool,
    /// Current server time (UTC).
    pub time: Timestamp,
    /// Active backend name.
    pub backend: &'static str,
}

/// GET /health -- liveness plus a backend connectivity probe.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ok = state.store.ping().await.is_ok();

    Json(HealthResponse {
        ok,
        time: chrono::Utc::now(),
        backend: state.store.backend_name(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
