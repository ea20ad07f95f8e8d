//! Anime detail page: metadata from `.Ficha`/`.Thumb`/`.Description` and the
//! episode list from the inline `var episodes = [...]` script.

use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::{markers, selectors};
use crate::document::Document;
use crate::embedded::{self, EmbeddedError};
use crate::models::{Anime, AnimeInfo, Episode};

use super::{normalize_poster, validate_slug, ExtractError};

/// Parse anime metadata and episodes from the detail page HTML
///
/// # Errors
/// * `NotFound` when the slug is unusable or the page carries no title
/// * `Parse` when the episode array is present but cannot be decoded
///
/// A page without the episode script yields an empty episode list.
pub fn parse_anime_detail(html: &str, slug: &str, base_url: &str) -> Result<AnimeInfo, ExtractError> {
    let slug = validate_slug(slug)?;
    let document = Document::parse(html);

    let title = document
        .first_text(selectors::DETAIL_TITLE)
        .ok_or_else(|| ExtractError::NotFound(format!("title for anime {:?}", slug)))?;

    let poster = document
        .first_attr(selectors::DETAIL_POSTER, "src")
        .unwrap_or_default();

    let synopsis = document
        .first_text(selectors::DETAIL_SYNOPSIS)
        .unwrap_or_default();

    let anime = Anime {
        id: slug.to_string(),
        title,
        poster: normalize_poster(base_url, &poster),
        anime_type: None,
        synopsis: Some(synopsis),
    };

    let episodes = parse_episodes(&document, slug)?;
    debug!("Parsed {} episodes for {}", episodes.len(), slug);

    Ok(AnimeInfo { anime, episodes })
}

/// Episodes in ascending order; the site lists them newest-first
fn parse_episodes(document: &Document, slug: &str) -> Result<Vec<Episode>, ExtractError> {
    let Some(script) = document.script_containing(markers::EPISODES) else {
        debug!("No episode script on page for {}", slug);
        return Ok(Vec::new());
    };

    let inner = match embedded::locate_episodes(&script) {
        Ok(inner) => inner,
        Err(EmbeddedError::MarkerMissing(_)) => {
            warn!("Episode script for {} did not match the array pattern", slug);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let entries: Vec<Value> = embedded::decode_episodes(inner)?;

    let mut episodes: Vec<Episode> = entries
        .iter()
        .filter_map(|entry| {
            let number = entry
                .as_array()
                .and_then(|fields| fields.first())
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n >= 1);
            if number.is_none() {
                debug!("Skipping malformed episode entry {}", entry);
            }
            number
        })
        .map(|number| Episode::new(slug, number))
        .collect();

    episodes.reverse();
    // stable: keeps reversed order for any repeated numbers
    episodes.sort_by_key(|episode| episode.number);

    Ok(episodes)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any newest-first source array comes back ascending, with
        /// composite ids and every element recovered.
        #[test]
        fn property_episodes_ascending_with_composite_ids(
            slug in "[a-z][a-z0-9-]{0,15}",
            ascending in prop::collection::btree_set(1u32..5000, 0..40),
        ) {
            let numbers: Vec<u32> = ascending.into_iter().rev().collect();
            let array = numbers
                .iter()
                .map(|n| format!("[{},{}]", n, n + 10000))
                .collect::<Vec<_>>()
                .join(",");
            let html = format!(
                r#"<div class="Ficha"><h1 class="Title">T</h1></div><script>var episodes = [{}];</script>"#,
                array
            );

            let info = parse_anime_detail(&html, &slug, "https://site.test").unwrap();
            prop_assert_eq!(info.episodes.len(), numbers.len());
            for pair in info.episodes.windows(2) {
                prop_assert!(pair[0].number < pair[1].number);
            }
            for episode in &info.episodes {
                prop_assert_eq!(&episode.id, &format!("{}-{}", slug, episode.number));
                prop_assert_eq!(&episode.anime_id, &slug);
            }
        }
    }
}
