//! NocoDB table-records proxy backend.
//!
//! Talks to the NocoDB v2 REST API (`/api/v2/tables/{table}/records`) with a
//! static `xc-token`. One table row per anime: scalar columns for the flat
//! fields, JSON columns for `alt_titles`, `genres`, `movie_stream_links`,
//! and `seasons`, plus an `added_at` datetime column. Record ids are
//! NocoDB's integer `Id`.
//!
//! NocoDB has no nested-update primitive, so targeted appends are a
//! read-modify-write of the affected JSON column; atomicity is whatever the
//! backend provides for a single-row PATCH.

use async_trait::async_trait;
use serde_json::{Map, Value};

use anibase_core::catalog::{AnimeDocument, AnimeKind, AnimeRecord, LinkTarget, StreamLink};
use anibase_core::pagination::Page;
use anibase_core::types::Timestamp;
use anibase_core::update::AnimeUpdate;

use crate::error::StoreError;
use crate::CatalogStore;

/// Columns NocoDB stores as JSON; coerced back from strings on read.
const JSON_COLUMNS: &[&str] = &["alt_titles", "genres", "movie_stream_links", "seasons"];

pub struct NocoDbStore {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    table_id: String,
}

impl NocoDbStore {
    pub fn new(base_url: &str, api_token: &str, table_id: &str) -> Result<Self, StoreError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            table_id: table_id.to_string(),
        })
    }

    fn records_url(&self) -> String {
        format!("{}/api/v2/tables/{}/records", self.base_url, self.table_id)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http.request(method, url).header("xc-token", &self.api_token)
    }

    /// Convert a non-success response into a passthrough `Backend` error.
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

    async fn fetch_record(&self, id: &str) -> Result<Option<AnimeRecord>, StoreError> {
        let url = format!("{}/{id}", self.records_url());
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let value: Value = Self::check(response).await?.json().await?;
        record_from_value(value).map(Some)
    }

    /// PATCH the given columns on one record and return the refreshed record.
    async fn patch_record(
        &self,
        id: &str,
        mut fields: Map<String, Value>,
    ) -> Result<Option<AnimeRecord>, StoreError> {
        fields.insert("Id".to_string(), id_value(id));
        let response = self
            .request(reqwest::Method::PATCH, &self.records_url())
            .json(&Value::Object(fields))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::check(response).await?;
        self.fetch_record(id).await
    }
}

#[async_trait]
impl CatalogStore for NocoDbStore {
    fn backend_name(&self) -> &'static str {
        "nocodb"
    }

    /// NocoDB record ids are positive integers.
    fn is_valid_id(&self, id: &str) -> bool {
        !id.is_empty() && id != "0" && id.bytes().all(|b| b.is_ascii_digit())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}?limit=1", self.records_url());
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        Self::check(response).await.map(|_| ())
    }

    async fn list(
        &self,
        kind: Option<AnimeKind>,
        page: Page,
    ) -> Result<Vec<AnimeRecord>, StoreError> {
        let mut request = self
            .request(reqwest::Method::GET, &self.records_url())
            .query(&[("sort", "-added_at")])
            .query(&[("limit", page.limit), ("offset", page.skip)]);
        if let Some(kind) = kind {
            request = request.query(&[("where", format!("(type,eq,{})", kind.as_str()))]);
        }

        let response = Self::check(request.send().await?).await?;
        let body: Value = response.json().await?;
        let rows = body
            .get("list")
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::Malformed("missing 'list' in response".to_string()))?;

        rows.iter().cloned().map(record_from_value).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<AnimeRecord>, StoreError> {
        self.fetch_record(id).await
    }

    async fn insert(
        &self,
        doc: AnimeDocument,
        added_at: Timestamp,
    ) -> Result<AnimeRecord, StoreError> {
        let mut fields = document_fields(&doc)?;
        fields.insert("added_at".to_string(), Value::String(added_at.to_rfc3339()));

        let response = self
            .request(reqwest::Method::POST, &self.records_url())
            .json(&Value::Object(fields))
            .send()
            .await?;
        let created: Value = Self::check(response).await?.json().await?;

        let id = created
            .get("Id")
            .map(value_to_id)
            .ok_or_else(|| StoreError::Malformed("insert response missing 'Id'".to_string()))?;

        self.fetch_record(&id)
            .await?
            .ok_or_else(|| StoreError::Malformed(format!("inserted record {id} not found")))
    }

    async fn update_fields(
        &self,
        id: &str,
        update: &AnimeUpdate,
    ) -> Result<Option<AnimeRecord>, StoreError> {
        // Existence check first: NocoDB's PATCH error shapes vary, the
        // absent-record case must stay a clean not-found.
        if self.fetch_record(id).await?.is_none() {
            return Ok(None);
        }
        self.patch_record(id, update.to_document()?).await
    }

    async fn append_links(
        &self,
        id: &str,
        target: &LinkTarget,
        links: &[StreamLink],
    ) -> Result<Option<AnimeRecord>, StoreError> {
        let Some(mut record) = self.fetch_record(id).await? else {
            return Ok(None);
        };

        let doc = &mut record.doc;
        let column = match *target {
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
        fields.insert(column.0.to_string(), column.1);
        self.patch_record(id, fields).await
    }
}

/// The document's columns as a NocoDB fields object.
fn document_fields(doc: &AnimeDocument) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(doc)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::Malformed("document is not an object".to_string())),
    }
}

/// Translate a NocoDB record into the catalog shape: pull out `Id` and
/// `added_at`, coerce stringified JSON columns, ignore system columns.
fn record_from_value(value: Value) -> Result<AnimeRecord, StoreError> {
    let Value::Object(mut fields) = value else {
        return Err(StoreError::Malformed("record is not an object".to_string()));
    };

    let id = fields
        .remove("Id")
        .map(|v| value_to_id(&v))
        .ok_or_else(|| StoreError::Malformed("record missing 'Id'".to_string()))?;

    for column in JSON_COLUMNS {
        coerce_json_column(&mut fields, column);
    }

    let added_at = fields
        .remove("added_at")
        .and_then(|v| v.as_str().map(str::to_owned))
        .ok_or_else(|| StoreError::Malformed("record missing 'added_at'".to_string()))?;
    let added_at = added_at
        .parse::<Timestamp>()
        .map_err(|e| StoreError::Malformed(format!("bad added_at '{added_at}': {e}")))?;

    let doc: AnimeDocument = serde_json::from_value(Value::Object(fields))?;
    Ok(AnimeRecord { id, doc, added_at })
}

/// NocoDB returns JSON columns either as objects/arrays or as serialized
/// strings depending on version and driver; normalize the string form.
fn coerce_json_column(fields: &mut Map<String, Value>, column: &str) {
    if let Some(Value::String(raw)) = fields.get(column) {
        if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
            fields.insert(column.to_string(), parsed);
        }
    }
}

fn value_to_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn id_value(id: &str) -> Value {
    id.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::String(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_translation_coerces_stringified_json_columns() {
        let record = record_from_value(serde_json::json!({
            "Id": 7,
            "title": "Test",
            "alt_titles": "[\"Alt\"]",
            "type": "series",
            "genres": [],
            "seasons": "[{\"season\":1,\"episodes\":[{\"number\":1}]}]",
            "added_at": "2024-03-01T12:00:00Z",
            "CreatedAt": "2024-03-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(record.id, "7");
        assert_eq!(record.doc.alt_titles, vec!["Alt".to_string()]);
        assert_eq!(record.doc.seasons.as_ref().unwrap()[0].season, 1);
    }

    #[test]
    fn records_without_id_or_added_at_are_malformed() {
        assert!(record_from_value(serde_json::json!({"title": "x"})).is_err());
        assert!(record_from_value(serde_json::json!({
            "Id": 1, "title": "x", "type": "movie"
        }))
        .is_err());
    }

    #[test]
    fn id_validity_is_a_positive_integer() {
        let store = NocoDbStore::new("http://noco.local", "t", "tbl").unwrap();
        assert!(store.is_valid_id("12"));
        assert!(!store.is_valid_id("0"));
        assert!(!store.is_valid_id(""));
        assert!(!store.is_valid_id("abc"));
        assert!(!store.is_valid_id("-3"));
    }
}
