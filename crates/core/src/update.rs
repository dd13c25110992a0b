//! Sparse partial-update shape for `PATCH /editanime/{id}`.
//!
//! Each supplied field replaces the stored field wholesale (no deep merge:
//! supplying `seasons` replaces the entire seasons list). For the nullable
//! fields, "field omitted" and "field explicitly null" are different
//! operations: omitted leaves the stored value alone, explicit null clears
//! it. That distinction uses the double-`Option` serde idiom; the outer
//! `Option` is presence, the inner one nullability.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{AnimeDocument, AnimeKind, Season, StreamLink};

/// Sparse set of top-level fields to overwrite on an anime document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_titles: Option<Vec<String>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AnimeKind>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<Option<i32>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub synopsis: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub poster_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_stream_links: Option<Vec<StreamLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Vec<Season>>,
}

/// Deserialize a field that may be absent, null, or a value into
/// `None` / `Some(None)` / `Some(Some(v))` respectively. Relies on
/// `#[serde(default)]` supplying the outer `None` when the key is absent.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::deserialize(deserializer).map(Some)
}

impl AnimeUpdate {
    /// True when no field at all was supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.alt_titles.is_none()
            && self.kind.is_none()
            && self.year.is_none()
            && self.synopsis.is_none()
            && self.genres.is_none()
            && self.poster_url.is_none()
            && self.movie_stream_links.is_none()
            && self.seasons.is_none()
    }

    /// The supplied fields as a JSON object, explicit clears as nulls.
    ///
    /// Backends with a top-level merge primitive (the postgres `doc || $1`
    /// update) apply this object directly.
    pub fn to_document(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // Struct serialization always yields an object.
            _ => unreachable!("AnimeUpdate serializes to an object"),
        }
    }

    /// Overwrite exactly the supplied fields on `doc`, the in-memory
    /// equivalent of the merge in `to_document`. Used by backends that
    /// read-modify-write whole records.
    pub fn apply(&self, doc: &mut AnimeDocument) {
        if let Some(title) = &self.title {
            doc.title = title.clone();
        }
        if let Some(alt_titles) = &self.alt_titles {
            doc.alt_titles = alt_titles.clone();
        }
        if let Some(kind) = self.kind {
            doc.kind = kind;
        }
        if let Some(year) = self.year {
            doc.year = year;
        }
        if let Some(synopsis) = &self.synopsis {
            doc.synopsis = synopsis.clone();
        }
        if let Some(genres) = &self.genres {
            doc.genres = genres.clone();
        }
        if let Some(poster_url) = &self.poster_url {
            doc.poster_url = poster_url.clone();
        }
        if let Some(links) = &self.movie_stream_links {
            doc.movie_stream_links = Some(links.clone());
        }
        if let Some(seasons) = &self.seasons {
            doc.seasons = Some(seasons.clone());
        }
    }
}
