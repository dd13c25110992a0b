//! Payload validation for create/update/add-link requests.
//!
//! Season and episode numbers must be >= 1 and stream-link URLs must parse
//! as absolute URLs. Season/episode number uniqueness is an assumed
//! invariant, not enforced here.

use url::Url;

use crate::catalog::{AnimeDocument, Season, StreamLink};
use crate::update::AnimeUpdate;

/// Validate a single stream link: the URL must be well-formed.
pub fn validate_stream_link(link: &StreamLink) -> Result<(), String> {
    Url::parse(&link.url)
        .map(|_| ())
        .map_err(|_| format!("Invalid stream link url '{}'", link.url))
}

/// Validate every link in a list.
pub fn validate_stream_links(links: &[StreamLink]) -> Result<(), String> {
    links.iter().try_for_each(validate_stream_link)
}

/// Validate a seasons list: positive numbers, well-formed nested links.
pub fn validate_seasons(seasons: &[Season]) -> Result<(), String> {
    for season in seasons {
        if season.season == 0 {
            return Err("Season numbers must be >= 1".to_string());
        }
        for episode in season.episodes.as_deref().unwrap_or_default() {
            if episode.number == 0 {
                return Err("Episode numbers must be >= 1".to_string());
            }
            validate_stream_links(episode.stream_links.as_deref().unwrap_or_default())?;
        }
    }
    Ok(())
}

/// Validate a full document payload (create).
pub fn validate_document(doc: &AnimeDocument) -> Result<(), String> {
    if let Some(url) = &doc.poster_url {
        Url::parse(url).map_err(|_| format!("Invalid poster_url '{url}'"))?;
    }
    validate_stream_links(doc.movie_stream_links.as_deref().unwrap_or_default())?;
    validate_seasons(doc.seasons.as_deref().unwrap_or_default())
}

/// Validate the supplied fields of a sparse update.
pub fn validate_update(update: &AnimeUpdate) -> Result<(), String> {
    if let Some(Some(url)) = &update.poster_url {
        Url::parse(url).map_err(|_| format!("Invalid poster_url '{url}'"))?;
    }
    if let Some(links) = &update.movie_stream_links {
        validate_stream_links(links)?;
    }
    if let Some(seasons) = &update.seasons {
        validate_seasons(seasons)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::catalog::Episode;

    use super::*;

    fn link(url: &str) -> StreamLink {
        StreamLink {
            label: "720p".to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn well_formed_urls_pass() {
        assert!(validate_stream_link(&link("https://cdn.example/v/1")).is_ok());
    }

    #[test]
    fn relative_or_garbage_urls_fail() {
        assert!(validate_stream_link(&link("not a url")).is_err());
        assert!(validate_stream_link(&link("/relative/path")).is_err());
    }

    #[test]
    fn zero_numbers_are_rejected() {
        let seasons = vec![Season { season: 0, episodes: None }];
        assert!(validate_seasons(&seasons).is_err());

        let seasons = vec![Season {
            season: 1,
            episodes: Some(vec![Episode {
                number: 0,
                title: None,
                stream_links: None,
            }]),
        }];
        assert!(validate_seasons(&seasons).is_err());
    }

    #[test]
    fn nested_links_are_checked() {
        let seasons = vec![Season {
            season: 1,
            episodes: Some(vec![Episode {
                number: 1,
                title: None,
                stream_links: Some(vec![link("nope")]),
            }]),
        }];
        assert!(validate_seasons(&seasons).is_err());
    }
}
