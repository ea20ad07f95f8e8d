//! Search results from the browse page (`.ListAnimes .Anime`)

use tracing::debug;

use crate::constants::{defaults, selectors};
use crate::document::{attr_in, text_in, Document};
use crate::models::Anime;

use super::{extract_slug_from_url, is_url_safe_slug, normalize_poster};

/// Parse search results from the browse page HTML
///
/// Items without a title or a usable slug are skipped; the rest keep
/// document order.
pub fn parse_search_results(html: &str, base_url: &str) -> Vec<Anime> {
    let document = Document::parse(html);
    let mut results = Vec::new();

    for item in document.select_all(selectors::SEARCH_ITEM) {
        let Some(title) = text_in(item, selectors::SEARCH_TITLE) else {
            debug!("Skipping search item without title");
            continue;
        };

        let slug = attr_in(item, selectors::SEARCH_LINK, "href")
            .map(|href| extract_slug_from_url(&href))
            .unwrap_or_default();
        if !is_url_safe_slug(&slug) {
            debug!("Skipping search item {:?} without usable slug", title);
            continue;
        }

        let poster = attr_in(item, selectors::SEARCH_IMAGE, "src")
            .or_else(|| attr_in(item, selectors::SEARCH_IMAGE, "data-src"))
            .unwrap_or_default();

        let anime_type = text_in(item, selectors::SEARCH_TYPE)
            .unwrap_or_else(|| defaults::ANIME_TYPE.to_string());

        results.push(Anime {
            id: slug,
            title,
            poster: normalize_poster(base_url, &poster),
            anime_type: Some(anime_type),
            synopsis: None,
        });
    }

    results
}
