use std::sync::Arc;

use anibase_store::CatalogStore;

use crate::config::ServerConfig;

/// Shared application state available to all axum handlers via
/// `State<AppState>`. Cheaply cloneable; the store handle is the one
/// long-lived process-wide backend connection.
#[derive(Clone)]
pub struct AppState {
    /// The selected catalog backend.
    pub store: Arc<dyn CatalogStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
