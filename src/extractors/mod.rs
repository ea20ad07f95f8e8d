//! Structured extractors for the scraped anime site
//!
//! Each extractor turns fetched HTML into typed records. They are pure
//! functions over HTML text; fetching and the per-extractor failure policy
//! (swallow to empty vs propagate) live in [`crate::pipeline`].

pub mod detail;
pub mod search;
pub mod servers;

pub use detail::parse_anime_detail;
pub use search::parse_search_results;
pub use servers::parse_video_servers;

use thiserror::Error;
use url::Url;

use crate::embedded::EmbeddedError;
use crate::fetcher::FetchError;

/// Errors raised by an extraction stage
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The page could not be retrieved through the proxy
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// A document or embedded literal could not be decoded
    #[error("Parse failed: {0}")]
    Parse(String),

    /// An expected selector, marker or identifier is absent
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<EmbeddedError> for ExtractError {
    fn from(err: EmbeddedError) -> Self {
        match err {
            EmbeddedError::MarkerMissing(marker) => {
                ExtractError::NotFound(format!("script marker `{}`", marker))
            }
            EmbeddedError::Decode(msg) => ExtractError::Parse(msg),
        }
    }
}

/// Extract slug from a permalink
///
/// Takes a URL like "https://www3.animeflv.net/anime/one-piece-tv?ref=1"
/// and returns "one-piece-tv"
pub fn extract_slug_from_url(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .unwrap_or("")
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}

/// Whether `slug` is non-empty and made only of unreserved URL characters
pub fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
}

/// Reject slugs that could not have come from a permalink
pub fn validate_slug(slug: &str) -> Result<&str, ExtractError> {
    if is_url_safe_slug(slug) {
        Ok(slug)
    } else {
        Err(ExtractError::NotFound(format!("invalid anime slug {:?}", slug)))
    }
}

/// Make a poster source absolute against the site origin
pub fn normalize_poster(base_url: &str, src: &str) -> String {
    let src = src.trim();
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_string();
    }

    match Url::parse(base_url).and_then(|base| base.join(src)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{}", base_url.trim_end_matches('/'), src),
    }
}
