/// Storage-layer error type.
///
/// Database and transport failures convert via `#[from]`; `Backend` keeps
/// the upstream HTTP status so the API layer can pass proxy-variant errors
/// through verbatim.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend selection / environment configuration problem at startup.
    #[error("invalid store configuration: {0}")]
    Config(String),

    /// A database error from sqlx (postgres backend).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failure at startup (postgres backend).
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// An HTTP transport error talking to a proxy backend.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A non-success response from a proxy backend; the status is passed
    /// through to the caller.
    #[error("backend responded {status}: {message}")]
    Backend { status: u16, message: String },

    /// A record that does not decode into the catalog shape.
    #[error("malformed backend record: {0}")]
    Malformed(String),

    /// A JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
