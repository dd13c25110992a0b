//! Create, sparse update, and targeted link append.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{patch, post};
use axum::Router;
use serde::Deserialize;

use anibase_core::catalog::{AnimeDocument, AnimeKind, LinkTarget, StreamLink};
use anibase_core::error::CoreError;
use anibase_core::update::AnimeUpdate;
use anibase_core::validation::{validate_document, validate_stream_links, validate_update};
use anibase_store::CatalogStore;

use crate::error::AppResult;
use crate::extract::Json;
use crate::routes::ensure_valid_id;
use crate::state::AppState;

/// Body for `PATCH /addlink/{id}`: where the links go (season/episode for
/// series, ignored for movies) and the links themselves.
#[derive(Debug, Deserialize)]
pub struct AddLinkPayload {
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub links: Vec<StreamLink>,
}

/// POST /addanime
///
/// The creation timestamp is stamped here; the backend assigns the id.
/// Whether `type` matches the populated nested field is not checked
/// (caller responsibility).
async fn add_anime(
    State(state): State<AppState>,
    Json(doc): Json<AnimeDocument>,
) -> AppResult<impl IntoResponse> {
    validate_document(&doc).map_err(CoreError::Validation)?;

    let record = state.store.insert(doc, chrono::Utc::now()).await?;

    tracing::info!(id = %record.id, kind = record.doc.kind.as_str(), "Anime created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// PATCH /editanime/{id}
///
/// Overwrites exactly the supplied top-level fields (whole-field replace,
/// no deep merge) and returns the updated record.
async fn edit_anime(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<AnimeUpdate>,
) -> AppResult<impl IntoResponse> {
    ensure_valid_id(state.store.as_ref(), &id)?;
    if update.is_empty() {
        return Err(CoreError::Validation("No fields to update".to_string()).into());
    }
    validate_update(&update).map_err(CoreError::Validation)?;

    let record = state
        .store
        .update_fields(&id, &update)
        .await?
        .ok_or(CoreError::NotFound("Anime"))?;

    tracing::info!(id = %record.id, "Anime updated");
    Ok(Json(record))
}

/// PATCH /addlink/{id}
///
/// Appends links to a movie's list or to one specific episode's list,
/// never touching sibling data. A series target that matches no
/// season/episode is a silent no-op: the unmodified record comes back
/// with 200. Existing clients rely on that, even though the read path
/// answers the same miss with a 404.
async fn add_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AddLinkPayload>,
) -> AppResult<impl IntoResponse> {
    ensure_valid_id(state.store.as_ref(), &id)?;
    if payload.links.is_empty() {
        return Err(CoreError::Validation("No links to add".to_string()).into());
    }
    validate_stream_links(&payload.links).map_err(CoreError::Validation)?;

    let record = state
        .store
        .get(&id)
        .await?
        .ok_or(CoreError::NotFound("Anime"))?;

    let target = match record.doc.kind {
        AnimeKind::Movie => LinkTarget::Movie,
        AnimeKind::Series => match (payload.season, payload.episode) {
            (Some(season), Some(number)) => LinkTarget::Episode { season, number },
            _ => {
                return Err(CoreError::Validation(
                    "Season & episode required for series".to_string(),
                )
                .into())
            }
        },
    };

    let updated = state
        .store
        .append_links(&id, &target, &payload.links)
        .await?
        .ok_or(CoreError::NotFound("Anime"))?;

    tracing::info!(id = %updated.id, count = payload.links.len(), "Links appended");
    Ok(Json(updated))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/addanime", post(add_anime))
        .route("/editanime/{id}", patch(edit_anime))
        .route("/addlink/{id}", patch(add_link))
}
