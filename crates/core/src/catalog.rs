//! Catalog entity shapes and the nested season/episode traversals.
//!
//! An anime is either a movie (stream links directly on the document) or a
//! series (links nested under seasons and episodes). Season and episode
//! numbers are assumed unique but not enforced; on duplicates the first
//! match in list order wins.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Whether an anime is a standalone movie or an episodic series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimeKind {
    Movie,
    Series,
}

impl AnimeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnimeKind::Movie => "movie",
            AnimeKind::Series => "series",
        }
    }
}

/// One playable source: a quality/label tag plus its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLink {
    pub label: String,
    pub url: String,
}

/// An episode within a season. `stream_links` is optional on ingest and
/// created lazily by the first targeted append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_links: Option<Vec<StreamLink>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub season: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<Vec<Episode>>,
}

/// The stored document shape, without backend-assigned identity.
///
/// Which of `movie_stream_links` / `seasons` is meaningful is determined by
/// `kind`; the service does not enforce that the populated field matches
/// (caller responsibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeDocument {
    pub title: String,
    #[serde(default)]
    pub alt_titles: Vec<String>,
    #[serde(rename = "type")]
    pub kind: AnimeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_stream_links: Option<Vec<StreamLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Vec<Season>>,
}

/// A stored anime: backend-assigned opaque id + document + creation time.
///
/// The id is always a string in the public shape, whatever the backend uses
/// internally, and is never changed by updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub id: String,
    #[serde(flatten)]
    pub doc: AnimeDocument,
    pub added_at: Timestamp,
}

/// Where a targeted link append lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// Append to the document's `movie_stream_links`.
    Movie,
    /// Append to the matching episode's `stream_links`.
    Episode { season: u32, number: u32 },
}

/// A resolved stream lookup, borrowing the matched link list.
#[derive(Debug, PartialEq)]
pub enum ResolvedStream<'a> {
    Movie { links: &'a [StreamLink] },
    Series { season: u32, episode: u32, links: &'a [StreamLink] },
}

impl AnimeDocument {
    /// Resolve the stream-link list for this document.
    ///
    /// Movies return their `movie_stream_links` (possibly empty) regardless
    /// of the season/episode arguments. Series require both numbers and do a
    /// linear scan of seasons then episodes; a failed lookup does not
    /// distinguish "wrong season" from "wrong episode".
    pub fn resolve_stream(
        &self,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Result<ResolvedStream<'_>, CoreError> {
        if self.kind == AnimeKind::Movie {
            let links = self.movie_stream_links.as_deref().unwrap_or_default();
            return Ok(ResolvedStream::Movie { links });
        }

        let (season, episode) = match (season, episode) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                return Err(CoreError::Validation(
                    "For series, season & episode required".to_string(),
                ))
            }
        };

        self.find_episode(season, episode)
            .map(|ep| ResolvedStream::Series {
                season,
                episode,
                links: ep.stream_links.as_deref().unwrap_or_default(),
            })
            .ok_or(CoreError::NotFound("Season/Episode"))
    }

    /// Append links to `movie_stream_links`, creating the list if absent.
    /// Existing entries are left untouched; no dedup, insertion order.
    pub fn append_movie_links(&mut self, links: &[StreamLink]) {
        self.movie_stream_links
            .get_or_insert_with(Vec::new)
            .extend_from_slice(links);
    }

    /// Append links to the stream list of the episode matching
    /// `season`/`number`, leaving every sibling season and episode
    /// structurally untouched.
    ///
    /// Returns `false` when no season/episode combination matched, in which
    /// case the document is unchanged (callers surface this as a no-op, not
    /// an error).
    pub fn append_episode_links(&mut self, season: u32, number: u32, links: &[StreamLink]) -> bool {
        match self.find_episode_mut(season, number) {
            Some(ep) => {
                ep.stream_links
                    .get_or_insert_with(Vec::new)
                    .extend_from_slice(links);
                true
            }
            None => false,
        }
    }

    fn find_episode(&self, season: u32, number: u32) -> Option<&Episode> {
        self.seasons
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|s| s.season == season)?
            .episodes
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|ep| ep.number == number)
    }

    fn find_episode_mut(&mut self, season: u32, number: u32) -> Option<&mut Episode> {
        self.seasons
            .as_deref_mut()?
            .iter_mut()
            .find(|s| s.season == season)?
            .episodes
            .as_deref_mut()?
            .iter_mut()
            .find(|ep| ep.number == number)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn link(label: &str, url: &str) -> StreamLink {
        StreamLink {
            label: label.to_string(),
            url: url.to_string(),
        }
    }

    fn series_doc() -> AnimeDocument {
        AnimeDocument {
            title: "Test Series".to_string(),
            alt_titles: vec![],
            kind: AnimeKind::Series,
            year: Some(2020),
            synopsis: None,
            genres: vec![],
            poster_url: None,
            movie_stream_links: None,
            seasons: Some(vec![
                Season {
                    season: 1,
                    episodes: Some(vec![
                        Episode {
                            number: 1,
                            title: None,
                            stream_links: None,
                        },
                        Episode {
                            number: 2,
                            title: Some("Second".to_string()),
                            stream_links: Some(vec![link("720p", "https://x/a")]),
                        },
                    ]),
                },
                Season {
                    season: 2,
                    episodes: Some(vec![Episode {
                        number: 1,
                        title: None,
                        stream_links: Some(vec![link("1080p", "https://x/b")]),
                    }]),
                },
            ]),
        }
    }

    fn movie_doc() -> AnimeDocument {
        AnimeDocument {
            title: "Test Movie".to_string(),
            alt_titles: vec![],
            kind: AnimeKind::Movie,
            year: None,
            synopsis: None,
            genres: vec![],
            poster_url: None,
            movie_stream_links: Some(vec![link("1080p", "https://cdn/1")]),
            seasons: None,
        }
    }

    #[test]
    fn movie_resolution_ignores_season_and_episode() {
        let doc = movie_doc();
        let resolved = doc.resolve_stream(Some(3), Some(99)).unwrap();
        assert_matches!(resolved, ResolvedStream::Movie { links } if links.len() == 1);
    }

    #[test]
    fn movie_without_links_resolves_to_empty_list() {
        let mut doc = movie_doc();
        doc.movie_stream_links = None;
        let resolved = doc.resolve_stream(None, None).unwrap();
        assert_matches!(resolved, ResolvedStream::Movie { links } if links.is_empty());
    }

    #[test]
    fn series_resolution_finds_the_exact_episode() {
        let doc = series_doc();
        let resolved = doc.resolve_stream(Some(1), Some(2)).unwrap();
        assert_matches!(
            resolved,
            ResolvedStream::Series { season: 1, episode: 2, links }
                if links == [link("720p", "https://x/a")]
        );
    }

    #[test]
    fn series_resolution_requires_both_numbers() {
        let doc = series_doc();
        assert_matches!(
            doc.resolve_stream(Some(1), None),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            doc.resolve_stream(None, Some(2)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn series_resolution_misses_are_not_found() {
        let doc = series_doc();
        assert_matches!(
            doc.resolve_stream(Some(1), Some(99)),
            Err(CoreError::NotFound("Season/Episode"))
        );
        assert_matches!(
            doc.resolve_stream(Some(9), Some(1)),
            Err(CoreError::NotFound("Season/Episode"))
        );
    }

    #[test]
    fn duplicate_numbers_resolve_to_the_first_match() {
        let mut doc = series_doc();
        // Duplicate season 1 with a different episode 2.
        doc.seasons.as_mut().unwrap().push(Season {
            season: 1,
            episodes: Some(vec![Episode {
                number: 2,
                title: None,
                stream_links: Some(vec![link("shadow", "https://x/shadow")]),
            }]),
        });

        let resolved = doc.resolve_stream(Some(1), Some(2)).unwrap();
        assert_matches!(
            resolved,
            ResolvedStream::Series { links, .. } if links[0].label == "720p"
        );
    }

    #[test]
    fn movie_append_creates_the_list_when_absent() {
        let mut doc = movie_doc();
        doc.movie_stream_links = None;
        doc.append_movie_links(&[link("480p", "https://cdn/2")]);
        assert_eq!(
            doc.movie_stream_links,
            Some(vec![link("480p", "https://cdn/2")])
        );
    }

    #[test]
    fn movie_append_preserves_existing_links_in_order() {
        let mut doc = movie_doc();
        doc.append_movie_links(&[link("480p", "https://cdn/2"), link("720p", "https://cdn/3")]);
        let links = doc.movie_stream_links.unwrap();
        assert_eq!(
            links,
            vec![
                link("1080p", "https://cdn/1"),
                link("480p", "https://cdn/2"),
                link("720p", "https://cdn/3"),
            ]
        );
    }

    #[test]
    fn episode_append_touches_only_the_target_episode() {
        let mut doc = series_doc();
        let before = doc.clone();

        assert!(doc.append_episode_links(1, 2, &[link("new", "https://x/new")]));

        let seasons = doc.seasons.as_ref().unwrap();
        let target = &seasons[0].episodes.as_ref().unwrap()[1];
        assert_eq!(
            target.stream_links.as_ref().unwrap().last().unwrap().label,
            "new"
        );

        // Sibling episode and sibling season are unchanged.
        assert_eq!(
            seasons[0].episodes.as_ref().unwrap()[0],
            before.seasons.as_ref().unwrap()[0].episodes.as_ref().unwrap()[0]
        );
        assert_eq!(seasons[1], before.seasons.as_ref().unwrap()[1]);
    }

    #[test]
    fn episode_append_is_a_no_op_on_miss() {
        let mut doc = series_doc();
        let before = doc.clone();
        assert!(!doc.append_episode_links(1, 99, &[link("x", "https://x/x")]));
        assert_eq!(doc, before);
    }

    #[test]
    fn record_serializes_flattened_with_string_id() {
        let record = AnimeRecord {
            id: "abc123".to_string(),
            doc: movie_doc(),
            added_at: chrono::Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], "abc123");
        assert_eq!(value["title"], "Test Movie");
        assert_eq!(value["type"], "movie");
        assert!(value.get("seasons").is_none());
    }
}
