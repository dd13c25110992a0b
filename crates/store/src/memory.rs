//! In-process catalog store.
//!
//! Backs the API integration tests and local development runs
//! (`STORE_BACKEND=memory`). Single `RwLock` around the map; appends apply
//! under the write lock, so nothing is lost between concurrent appends.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use anibase_core::catalog::{AnimeDocument, AnimeKind, AnimeRecord, LinkTarget, StreamLink};
use anibase_core::pagination::Page;
use anibase_core::types::Timestamp;
use anibase_core::update::AnimeUpdate;

use crate::error::StoreError;
use crate::CatalogStore;

struct StoredAnime {
    doc: AnimeDocument,
    added_at: Timestamp,
    /// Insertion sequence, the newest-first tie-break when two records
    /// share an `added_at`.
    seq: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, StoredAnime>>,
    next_seq: RwLock<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(id: Uuid, stored: &StoredAnime) -> AnimeRecord {
        AnimeRecord {
            id: id.to_string(),
            doc: stored.doc.clone(),
            added_at: stored.added_at,
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn is_valid_id(&self, id: &str) -> bool {
        Uuid::parse_str(id).is_ok()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list(
        &self,
        kind: Option<AnimeKind>,
        page: Page,
    ) -> Result<Vec<AnimeRecord>, StoreError> {
        let records = self.records.read().await;

        let mut matching: Vec<(&Uuid, &StoredAnime)> = records
            .iter()
            .filter(|(_, stored)| kind.is_none_or(|k| stored.doc.kind == k))
            .collect();
        matching.sort_by(|(_, a), (_, b)| {
            b.added_at.cmp(&a.added_at).then(b.seq.cmp(&a.seq))
        });

        Ok(matching
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .map(|(id, stored)| Self::record(*id, stored))
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<AnimeRecord>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let records = self.records.read().await;
        Ok(records.get(&id).map(|stored| Self::record(id, stored)))
    }

    async fn insert(
        &self,
        doc: AnimeDocument,
        added_at: Timestamp,
    ) -> Result<AnimeRecord, StoreError> {
        let id = Uuid::now_v7();
        let seq = {
            let mut next = self.next_seq.write().await;
            *next += 1;
            *next
        };

        let stored = StoredAnime { doc, added_at, seq };
        let record = Self::record(id, &stored);
        self.records.write().await.insert(id, stored);
        Ok(record)
    }

    async fn update_fields(
        &self,
        id: &str,
        update: &AnimeUpdate,
    ) -> Result<Option<AnimeRecord>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|stored| {
            update.apply(&mut stored.doc);
            Self::record(id, stored)
        }))
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
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|stored| {
            match *target {
                LinkTarget::Movie => stored.doc.append_movie_links(links),
                LinkTarget::Episode { season, number } => {
                    // A miss is a silent no-op; the unmodified record is
                    // still returned.
                    stored.doc.append_episode_links(season, number, links);
                }
            }
            Self::record(id, stored)
        }))
    }
}
