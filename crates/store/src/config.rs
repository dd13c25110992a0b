//! Backend selection from environment variables.

use crate::error::StoreError;

/// Which catalog backend to run against, plus its connection settings.
///
/// Selected by `STORE_BACKEND` (default `postgres`):
///
/// | Backend      | Required env vars                                        |
/// |--------------|----------------------------------------------------------|
/// | `postgres`   | `DATABASE_URL`                                           |
/// | `nocodb`     | `NOCODB_BASE_URL`, `NOCODB_API_TOKEN`, `NOCODB_TABLE_ID` |
/// | `pocketbase` | `POCKETBASE_BASE_URL`, `POCKETBASE_COLLECTION`           |
/// | `memory`     | (none)                                                   |
///
/// `POCKETBASE_AUTH_TOKEN` is optional (open collections need none).
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Postgres {
        database_url: String,
    },
    NocoDb {
        base_url: String,
        api_token: String,
        table_id: String,
    },
    PocketBase {
        base_url: String,
        auth_token: Option<String>,
        collection: String,
    },
    Memory,
}

impl StoreConfig {
    /// Load the backend selection from the environment.
    pub fn from_env() -> Result<Self, StoreError> {
        let backend = std::env::var("STORE_BACKEND").unwrap_or_else(|_| "postgres".into());

        match backend.as_str() {
            "postgres" => Ok(Self::Postgres {
                database_url: require("DATABASE_URL")?,
            }),
            "nocodb" => Ok(Self::NocoDb {
                base_url: require("NOCODB_BASE_URL")?,
                api_token: require("NOCODB_API_TOKEN")?,
                table_id: require("NOCODB_TABLE_ID")?,
            }),
            "pocketbase" => Ok(Self::PocketBase {
                base_url: require("POCKETBASE_BASE_URL")?,
                auth_token: std::env::var("POCKETBASE_AUTH_TOKEN").ok(),
                collection: require("POCKETBASE_COLLECTION")?,
            }),
            "memory" => Ok(Self::Memory),
            other => Err(StoreError::Config(format!(
                "unknown STORE_BACKEND '{other}' (expected postgres, nocodb, pocketbase, or memory)"
            ))),
        }
    }
}

fn require(var: &str) -> Result<String, StoreError> {
    std::env::var(var).map_err(|_| StoreError::Config(format!("{var} must be set")))
}
