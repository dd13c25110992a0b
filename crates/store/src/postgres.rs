//! Document store on PostgreSQL: one JSONB column per anime.
//!
//! The primary backend variant. Documents are stored whole in `doc`;
//! `added_at` and `revision` are kept as real columns for the listing order
//! and the append compare-and-swap. Partial updates are a top-level `doc ||
//! $patch` merge, movie link appends are a single atomic statement, and
//! nested episode appends are a revision-guarded CAS loop. Every statement
//! that writes `doc` bumps `revision`, so the CAS sees concurrent edits and
//! movie appends too, not just competing episode appends, and retries
//! instead of pushing a stale document over them.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use anibase_core::catalog::{AnimeDocument, AnimeKind, AnimeRecord, LinkTarget, StreamLink};
use anibase_core::pagination::Page;
use anibase_core::types::Timestamp;
use anibase_core::update::AnimeUpdate;

use crate::error::StoreError;
use crate::CatalogStore;

/// Column list for anime queries.
const COLUMNS: &str = "id, doc, added_at";

/// Compare-and-swap write-back for episode appends: only lands when the
/// revision read is still current.
const CAS_WRITE_SQL: &str = "UPDATE anime SET doc = $2, revision = revision + 1 \
                             WHERE id = $1 AND revision = $3";

fn update_fields_sql() -> String {
    format!(
        "UPDATE anime SET doc = doc || $2, revision = revision + 1 \
         WHERE id = $1 RETURNING {COLUMNS}"
    )
}

fn append_movie_links_sql() -> String {
    format!(
        "UPDATE anime SET doc = jsonb_set(doc, '{{movie_stream_links}}', \
         coalesce(doc->'movie_stream_links', '[]'::jsonb) || $2), \
         revision = revision + 1 \
         WHERE id = $1 RETURNING {COLUMNS}"
    )
}

pub struct PostgresStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct AnimeRow {
    id: Uuid,
    doc: Value,
    added_at: Timestamp,
}

impl AnimeRow {
    fn into_record(self) -> Result<AnimeRecord, StoreError> {
        Ok(AnimeRecord {
            id: self.id.to_string(),
            doc: serde_json::from_value(self.doc)?,
            added_at: self.added_at,
        })
    }
}

impl PostgresStore {
    /// Connect, run migrations, and ensure the catalog indexes.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let store = Self { pool };
        store.ensure_indexes().await?;
        Ok(store)
    }

    /// Ensure the three catalog indexes: kind filter, newest-first listing,
    /// and a text index over title + alternate titles (not queried by any
    /// exposed route yet; title search is a planned addition).
    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_anime_type ON anime ((doc->>'type'))")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_anime_added_at ON anime (added_at DESC)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_anime_title_text ON anime USING GIN \
             (to_tsvector('simple', coalesce(doc->>'title', '') || ' ' || \
                          coalesce(doc->>'alt_titles', '')))",
        )
        .execute(&self.pool)
        .await?;

        tracing::debug!("Catalog indexes ensured");
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<AnimeRecord>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM anime WHERE id = $1");
        let row = sqlx::query_as::<_, AnimeRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(AnimeRow::into_record).transpose()
    }

    /// Nested episode append as a compare-and-swap loop: read the document
    /// and its revision, apply the append in memory, and write back only if
    /// the revision is unchanged. Any other write to the row (edit, movie
    /// append, competing episode append) bumps the revision, so a lost race
    /// reloads and retries instead of reverting that write.
    async fn append_episode_links_cas(
        &self,
        id: Uuid,
        season: u32,
        number: u32,
        links: &[StreamLink],
    ) -> Result<Option<AnimeRecord>, StoreError> {
        loop {
            let row = sqlx::query_as::<_, (Value, Timestamp, i64)>(
                "SELECT doc, added_at, revision FROM anime WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            let Some((doc_value, added_at, revision)) = row else {
                return Ok(None);
            };

            let mut doc: AnimeDocument = serde_json::from_value(doc_value)?;
            if !doc.append_episode_links(season, number, links) {
                // No matching season/episode: silent no-op, return the
                // record as stored.
                return Ok(Some(AnimeRecord {
                    id: id.to_string(),
                    doc,
                    added_at,
                }));
            }

            let result = sqlx::query(CAS_WRITE_SQL)
                .bind(id)
                .bind(serde_json::to_value(&doc)?)
                .bind(revision)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 1 {
                return Ok(Some(AnimeRecord {
                    id: id.to_string(),
                    doc,
                    added_at,
                }));
            }

            tracing::debug!(%id, "Lost append race, retrying");
        }
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    fn is_valid_id(&self, id: &str) -> bool {
        Uuid::parse_str(id).is_ok()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(
        &self,
        kind: Option<AnimeKind>,
        page: Page,
    ) -> Result<Vec<AnimeRecord>, StoreError> {
        let rows = match kind {
            Some(kind) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM anime WHERE doc->>'type' = $1 \
                     ORDER BY added_at DESC OFFSET $2 LIMIT $3"
                );
                sqlx::query_as::<_, AnimeRow>(&query)
                    .bind(kind.as_str())
                    .bind(page.skip)
                    .bind(page.limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM anime \
                     ORDER BY added_at DESC OFFSET $1 LIMIT $2"
                );
                sqlx::query_as::<_, AnimeRow>(&query)
                    .bind(page.skip)
                    .bind(page.limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(AnimeRow::into_record).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<AnimeRecord>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        self.fetch(id).await
    }

    async fn insert(
        &self,
        doc: AnimeDocument,
        added_at: Timestamp,
    ) -> Result<AnimeRecord, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO anime (id, doc, added_at) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(serde_json::to_value(&doc)?)
            .bind(added_at)
            .execute(&self.pool)
            .await?;

        Ok(AnimeRecord {
            id: id.to_string(),
            doc,
            added_at,
        })
    }

    async fn update_fields(
        &self,
        id: &str,
        update: &AnimeUpdate,
    ) -> Result<Option<AnimeRecord>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let patch = Value::Object(update.to_document()?);
        let row = sqlx::query_as::<_, AnimeRow>(&update_fields_sql())
            .bind(id)
            .bind(patch)
            .fetch_optional(&self.pool)
            .await?;
        row.map(AnimeRow::into_record).transpose()
    }

    async fn append_links(
        &self,
        id: &str,
        target: &LinkTarget,
        links: &[StreamLink],
    ) -> Result<Option<AnimeRecord>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        match *target {
            LinkTarget::Movie => {
                // Single atomic statement; concurrent movie appends both land.
                let row = sqlx::query_as::<_, AnimeRow>(&append_movie_links_sql())
                    .bind(id)
                    .bind(serde_json::to_value(links)?)
                    .fetch_optional(&self.pool)
                    .await?;
                row.map(AnimeRow::into_record).transpose()
            }
            LinkTarget::Episode { season, number } => {
                self.append_episode_links_cas(id, season, number, links).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // If any statement writes `doc` without bumping `revision`, the
    // episode-append compare-and-swap cannot see that write: the append
    // would pass its stale-revision check and push the pre-write document
    // back over it.
    #[test]
    fn every_doc_write_bumps_the_revision_guard() {
        let statements = [
            update_fields_sql(),
            append_movie_links_sql(),
            CAS_WRITE_SQL.to_string(),
        ];
        for sql in statements {
            assert!(
                sql.contains("revision = revision + 1"),
                "doc write misses the revision guard: {sql}"
            );
        }
    }

    #[test]
    fn cas_write_is_conditional_on_the_read_revision() {
        assert!(CAS_WRITE_SQL.contains("AND revision = $3"));
    }
}
