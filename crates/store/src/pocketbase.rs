//! PocketBase collection-records proxy backend.
//!
//! Talks to `/api/collections/{collection}/records` with an optional static
//! `Authorization` token. One record per anime with the document fields laid
//! out flat; PocketBase assigns the 15-character record id and the `created`
//! timestamp, which doubles as the catalog's creation time.
//!
//! The records API is page-based, so `skip` maps to `page = skip/limit + 1`
//! (exact whenever skip is a multiple of limit). Appends are a
//! read-modify-write of the affected field; there is no nested-update
//! primitive.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use anibase_core::catalog::{AnimeDocument, AnimeKind, AnimeRecord, LinkTarget, StreamLink};
use anibase_core::pagination::Page;
use anibase_core::types::Timestamp;
use anibase_core::update::AnimeUpdate;

use crate::error::StoreError;
use crate::CatalogStore;

/// Record keys PocketBase manages itself; stripped before decoding.
const SYSTEM_FIELDS: &[&str] = &["collectionId", "collectionName", "updated", "expand"];

pub struct PocketBaseStore {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    collection: String,
}

impl PocketBaseStore {
    pub fn new(
        base_url: &str,
        auth_token: Option<&str>,
        collection: &str,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.map(str::to_owned),
            collection: collection.to_string(),
        })
    }

    fn records_url(&self) -> String {
        format!("{}/api/collections/{}/records", self.base_url, self.collection)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.http.request(method, url);
        if let Some(token) = &self.auth_token {
            request = request.header("Authorization", token);
        }
        request
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CatalogStore for PocketBaseStore {
    fn backend_name(&self) -> &'static str {
        "pocketbase"
    }

    /// PocketBase record ids are 15 lowercase alphanumerics.
    fn is_valid_id(&self, id: &str) -> bool {
        id.len() == 15
            && id
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}?perPage=1", self.records_url());
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        Self::check(response).await.map(|_| ())
    }

    async fn list(
        &self,
        kind: Option<AnimeKind>,
        page: Page,
    ) -> Result<Vec<AnimeRecord>, StoreError> {
        // Page-based API: skip maps onto whole pages of size `limit`.
        let pb_page = page.skip / page.limit + 1;
        let mut request = self
            .request(reqwest::Method::GET, &self.records_url())
            .query(&[("sort", "-created"), ("skipTotal", "1")])
            .query(&[("page", pb_page), ("perPage", page.limit)]);
        if let Some(kind) = kind {
            request = request.query(&[("filter", format!("(type='{}')", kind.as_str()))]);
        }

        let response = Self::check(request.send().await?).await?;
        let body: Value = response.json().await?;
        let items = body
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::Malformed("missing 'items' in response".to_string()))?;

        items.iter().cloned().map(record_from_value).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<AnimeRecord>, StoreError> {
        let url = format!("{}/{id}", self.records_url());
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let value: Value = Self::check(response).await?.json().await?;
        record_from_value(value).map(Some)
    }

    async fn insert(
        &self,
        doc: AnimeDocument,
        _added_at: Timestamp,
    ) -> Result<AnimeRecord, StoreError> {
        // PocketBase stamps `created` itself; the service timestamp is not
        // sent.
        let response = self
            .request(reqwest::Method::POST, &self.records_url())
            .json(&doc)
            .send()
            .await?;
        let value: Value = Self::check(response).await?.json().await?;
        record_from_value(value)
    }

    async fn update_fields(
        &self,
        id: &str,
        update: &AnimeUpdate,
    ) -> Result<Option<AnimeRecord>, StoreError> {
        let url = format!("{}/{id}", self.records_url());
        let response = self
            .request(reqwest::Method::PATCH, &url)
            .json(&Value::Object(update.to_document()?))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let value: Value = Self::check(response).await?.json().await?;
        record_from_value(value).map(Some)
    }

    async fn append_links(
        &self,
        id: &str,
        target: &LinkTarget,
        links: &[StreamLink],
    ) -> Result<Option<AnimeRecord>, StoreError> {
        let Some(mut record) = self.get(id).await? else {
            return Ok(None);
        };

        let doc = &mut record.doc;
        let field = match *target {
            LinkTarget::Movie => {
                doc.append_movie_links(links);
                ("movie_stream_links", serde_json::to_value(&doc.movie_stream_links)?)
            }
            LinkTarget::Episode { season, number } => {
                if !doc.append_episode_links(season, number, links) {
                    // No matching season/episode: silent no-op.
                    return Ok(Some(record));
                }
                ("seasons", serde_json::to_value(&doc.seasons)?)
            }
        };

        let mut fields = Map::new();
        fields.insert(field.0.to_string(), field.1);

        let url = format!("{}/{id}", self.records_url());
        let response = self
            .request(reqwest::Method::PATCH, &url)
            .json(&Value::Object(fields))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let value: Value = Self::check(response).await?.json().await?;
        record_from_value(value).map(Some)
    }
}

/// Translate a PocketBase record: `id` + `created` out, system fields
/// stripped, the rest decoded as the document.
fn record_from_value(value: Value) -> Result<AnimeRecord, StoreError> {
    let Value::Object(mut fields) = value else {
        return Err(StoreError::Malformed("record is not an object".to_string()));
    };

    let id = fields
        .remove("id")
        .and_then(|v| v.as_str().map(str::to_owned))
        .ok_or_else(|| StoreError::Malformed("record missing 'id'".to_string()))?;

    let created = fields
        .remove("created")
        .and_then(|v| v.as_str().map(str::to_owned))
        .ok_or_else(|| StoreError::Malformed("record missing 'created'".to_string()))?;
    let added_at = parse_timestamp(&created)
        .ok_or_else(|| StoreError::Malformed(format!("bad created timestamp '{created}'")))?;

    for field in SYSTEM_FIELDS {
        fields.remove(*field);
    }

    let doc: AnimeDocument = serde_json::from_value(Value::Object(fields))?;
    Ok(AnimeRecord { id, doc, added_at })
}

/// PocketBase timestamps are `YYYY-MM-DD HH:MM:SS.fffZ` (space-separated);
/// accept plain RFC 3339 as well.
fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(ts) = raw.parse::<DateTime<Utc>>() {
        return Some(ts);
    }
    NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
