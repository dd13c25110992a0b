//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&skip=`).
///
/// Values are clamped via `Page::clamped` (limit into [1, 100], default 24;
/// skip floored to 0) rather than rejected.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

/// Query parameters for `/getdetails`.
#[derive(Debug, Deserialize)]
pub struct DetailsParams {
    pub id: String,
}

/// Query parameters for `/stream`.
///
/// `bolum` is a legacy alias for `episode` that deployed clients still
/// send; `episode` wins when both are supplied.
#[derive(Debug, Deserialize)]
pub struct StreamParams {
    pub id: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub bolum: Option<u32>,
}

impl StreamParams {
    pub fn episode_number(&self) -> Option<u32> {
        self.episode.or(self.bolum)
    }
}
