use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use anibase_core::error::CoreError;
use anibase_store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for storage
/// failures. Implements [`IntoResponse`] to produce the service's
/// `{"detail": "<message>"}` error shape.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `anibase_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage-layer error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A request the extractors could not deserialize (bad query string or
    /// JSON body); axum's status is kept, the body becomes `{"detail"}`.
    #[error("{detail}")]
    Rejection { status: StatusCode, detail: String },
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::Core(core) => match core {
                CoreError::InvalidId | CoreError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, core.to_string())
                }
                CoreError::NotFound(_) => (StatusCode::NOT_FOUND, core.to_string()),
            },
            AppError::Store(store) => classify_store_error(store),
            AppError::Rejection { status, detail } => (*status, detail.clone()),
        };

        (status, axum::Json(json!({ "detail": detail }))).into_response()
    }
}

/// Map a storage error to a status and detail message.
///
/// Proxy-backend responses pass their status through verbatim; everything
/// else is a sanitized 500 (the underlying error goes to the log, not the
/// client).
fn classify_store_error(err: &StoreError) -> (StatusCode, String) {
    match err {
        StoreError::Backend { status, message } => {
            tracing::warn!(status, %message, "Backend error passed through");
            let status =
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, message.clone())
        }
        other => {
            tracing::error!(error = %other, "Storage error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            )
        }
    }
}
