//! Listing and details routes.
//!
//! Listings filter by kind (none for `/latest`), newest first, with the
//! caller's limit/skip window clamped rather than rejected.

use axum::extract::State;
use axum::{routing::get, Json, Router};

use anibase_core::catalog::{AnimeKind, AnimeRecord};
use anibase_core::error::CoreError;
use anibase_core::pagination::Page;
use anibase_store::CatalogStore;

use crate::error::AppResult;
use crate::extract::Query;
use crate::query::{DetailsParams, PaginationParams};
use crate::routes::ensure_valid_id;
use crate::state::AppState;

/// GET /movies
async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Vec<AnimeRecord>>> {
    let page = Page::clamped(params.limit, params.skip);
    let records = state.store.list(Some(AnimeKind::Movie), page).await?;
    Ok(Json(records))
}

/// GET /series
async fn list_series(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Vec<AnimeRecord>>> {
    let page = Page::clamped(params.limit, params.skip);
    let records = state.store.list(Some(AnimeKind::Series), page).await?;
    Ok(Json(records))
}

/// GET /latest -- all kinds, newest first.
async fn list_latest(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Vec<AnimeRecord>>> {
    let page = Page::clamped(params.limit, params.skip);
    let records = state.store.list(None, page).await?;
    Ok(Json(records))
}

/// GET /getdetails?id=
async fn get_details(
    State(state): State<AppState>,
    Query(params): Query<DetailsParams>,
) -> AppResult<Json<AnimeRecord>> {
    ensure_valid_id(state.store.as_ref(), &params.id)?;

    let record = state
        .store
        .get(&params.id)
        .await?
        .ok_or(CoreError::NotFound("Anime"))?;
    Ok(Json(record))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/series", get(list_series))
        .route("/latest", get(list_latest))
        .route("/getdetails", get(get_details))
}
