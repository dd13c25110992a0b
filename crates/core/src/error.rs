/// Domain-level error type shared across the workspace.
///
/// Covers the three error kinds the catalog service can signal on its own:
/// malformed identifiers, missing records (or season/episode lookups), and
/// invalid request payloads. Backend/transport failures live in
/// `anibase-store`'s `StoreError`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The supplied id is not a well-formed identifier for the active backend.
    #[error("Invalid id")]
    InvalidId,

    /// No matching record (or nested season/episode) exists.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The request payload or query parameters are invalid.
    #[error("{0}")]
    Validation(String),
}
