//! Stream-link resolution.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use anibase_core::catalog::{ResolvedStream, StreamLink};
use anibase_core::error::CoreError;
use anibase_store::CatalogStore;

use crate::error::AppResult;
use crate::extract::Query;
use crate::query::StreamParams;
use crate::routes::ensure_valid_id;
use crate::state::AppState;

/// Stream resolution response: the matched link list plus enough context
/// to tell which case answered.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamResponse {
    Movie {
        links: Vec<StreamLink>,
    },
    Series {
        season: u32,
        episode: u32,
        links: Vec<StreamLink>,
    },
}

impl From<ResolvedStream<'_>> for StreamResponse {
    fn from(resolved: ResolvedStream<'_>) -> Self {
        match resolved {
            ResolvedStream::Movie { links } => StreamResponse::Movie {
                links: links.to_vec(),
            },
            ResolvedStream::Series {
                season,
                episode,
                links,
            } => StreamResponse::Series {
                season,
                episode,
                links: links.to_vec(),
            },
        }
    }
}

/// GET /stream?id=&season=&episode=
///
/// Movies answer with their own links whatever the season/episode params
/// say; series require both numbers and scan seasons then episodes, first
/// match wins.
async fn get_stream(
    State(state): State<AppState>,
    Query(params): Query<StreamParams>,
) -> AppResult<Json<StreamResponse>> {
    ensure_valid_id(state.store.as_ref(), &params.id)?;

    let record = state
        .store
        .get(&params.id)
        .await?
        .ok_or(CoreError::NotFound("Anime"))?;

    let resolved = record
        .doc
        .resolve_stream(params.season, params.episode_number())?;
    Ok(Json(StreamResponse::from(resolved)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/stream", get(get_stream))
}
