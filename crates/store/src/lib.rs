//! Pluggable catalog storage.
//!
//! The service's three historical variants differed only in which store they
//! proxied to; here that is one [`CatalogStore`] trait with a concrete
//! backend per variant (postgres document table, NocoDB table API,
//! PocketBase collection API) plus an in-memory store for tests and local
//! development. Backend selection happens once at startup via
//! [`config::StoreConfig::from_env`] and [`connect`].

use std::sync::Arc;

use async_trait::async_trait;

use anibase_core::catalog::{AnimeDocument, AnimeKind, AnimeRecord, LinkTarget, StreamLink};
use anibase_core::pagination::Page;
use anibase_core::types::Timestamp;
use anibase_core::update::AnimeUpdate;

pub mod config;
pub mod error;
pub mod memory;
pub mod nocodb;
pub mod pocketbase;
pub mod postgres;

pub use config::StoreConfig;
pub use error::StoreError;

/// The backend primitives the catalog service is built on: filtered
/// newest-first listing, get-by-id, insert, top-level field patch, and a
/// targeted append into a nested link list.
///
/// Implementations are long-lived, shared across requests, and hold no
/// per-request state. Concurrent appends to the same record must not lose
/// either append; how strongly that holds is a property of the concrete
/// backend (see each implementation).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Short backend name for logs and the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Whether `id` is a well-formed identifier for this backend.
    /// Handlers reject malformed ids up front (400, never 404).
    fn is_valid_id(&self, id: &str) -> bool;

    /// Cheap connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    /// List records, optionally filtered by kind, newest first, with the
    /// given limit/skip window applied by the backend.
    async fn list(&self, kind: Option<AnimeKind>, page: Page)
        -> Result<Vec<AnimeRecord>, StoreError>;

    /// Fetch one record by id. `None` when no record matches (a malformed
    /// id also resolves to `None`; callers validate ids first).
    async fn get(&self, id: &str) -> Result<Option<AnimeRecord>, StoreError>;

    /// Insert a new document. The backend assigns the id; `added_at` is the
    /// service-stamped creation time (backends with their own creation
    /// timestamp may use that instead).
    async fn insert(
        &self,
        doc: AnimeDocument,
        added_at: Timestamp,
    ) -> Result<AnimeRecord, StoreError>;

    /// Overwrite exactly the supplied top-level fields. `None` when no
    /// record matches.
    async fn update_fields(
        &self,
        id: &str,
        update: &AnimeUpdate,
    ) -> Result<Option<AnimeRecord>, StoreError>;

    /// Append links to the targeted list, leaving all sibling data
    /// untouched. A series target that matches no season/episode is a
    /// silent no-op: the unmodified record is returned. `None` only when
    /// the record itself is absent.
    async fn append_links(
        &self,
        id: &str,
        target: &LinkTarget,
        links: &[StreamLink],
    ) -> Result<Option<AnimeRecord>, StoreError>;
}

/// Connect the backend selected by `config`, ready to serve requests.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn CatalogStore>, StoreError> {
    let store: Arc<dyn CatalogStore> = match config {
        StoreConfig::Postgres { database_url } => {
            Arc::new(postgres::PostgresStore::connect(database_url).await?)
        }
        StoreConfig::NocoDb {
            base_url,
            api_token,
            table_id,
        } => Arc::new(nocodb::NocoDbStore::new(base_url, api_token, table_id)?),
        StoreConfig::PocketBase {
            base_url,
            auth_token,
            collection,
        } => Arc::new(pocketbase::PocketBaseStore::new(
            base_url,
            auth_token.as_deref(),
            collection,
        )?),
        StoreConfig::Memory => Arc::new(memory::MemoryStore::new()),
    };

    tracing::info!(backend = store.backend_name(), "Catalog store connected");
    Ok(store)
}
