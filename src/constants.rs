//! Constants module for the Anime Indexer
//!
//! Contains endpoint URL builders and the scraping hooks (CSS selectors and
//! inline script markers) the extractors depend on. These hooks are a contract
//! with the third-party site and can break without notice, so they all live here.

/// URL builder functions for all endpoints
pub mod endpoints {
    /// Browse page filtered by a free-text query
    pub fn search(base_url: &str, query: &str) -> String {
        format!("{}/browse?q={}", base_url, urlencoding::encode(query))
    }

    /// Anime detail page URL
    pub fn anime(base_url: &str, slug: &str) -> String {
        format!("{}/anime/{}", base_url, slug)
    }

    /// Episode playback page URL
    pub fn episode(base_url: &str, slug: &str, number: u32) -> String {
        format!("{}/ver/{}-{}", base_url, slug, number)
    }

    /// Proxy request URL wrapping an arbitrary target
    pub fn proxy(proxy_url: &str, target: &str) -> String {
        format!("{}{}", proxy_url, urlencoding::encode(target))
    }

    /// Gemini `generateContent` URL for a model
    pub fn generate_content(api_base: &str, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            api_base.trim_end_matches('/'),
            model
        )
    }
}

/// CSS selectors used by the structured extractors
pub mod selectors {
    pub const SEARCH_ITEM: &str = ".ListAnimes .Anime";
    pub const SEARCH_TITLE: &str = ".Title";
    pub const SEARCH_TYPE: &str = ".Type";
    pub const SEARCH_IMAGE: &str = "img";
    pub const SEARCH_LINK: &str = "a[href]";

    pub const DETAIL_TITLE: &str = ".Ficha .Title";
    pub const DETAIL_POSTER: &str = ".Thumb img";
    pub const DETAIL_SYNOPSIS: &str = ".Description p";

    pub const SCRIPT: &str = "script";
}

/// Inline script markers and capture patterns
pub mod markers {
    /// Substring identifying the script that carries the episode list
    pub const EPISODES: &str = "var episodes = [";
    /// Captures the inner elements of the episode array literal
    pub const EPISODES_PATTERN: &str = r"var episodes = \[(.*?)\];";

    /// Substring identifying the script that carries the server map
    pub const VIDEOS: &str = "var videos = {";
    /// Captures the whole server map object literal
    pub const VIDEOS_PATTERN: &str = r"var videos = (\{.*?\});";
}

/// Defaults shared by the configuration and the extractors
pub mod defaults {
    pub const BASE_URL: &str = "https://www3.animeflv.net";
    pub const PROXY_URL: &str = "https://api.allorigins.win/get?url=";
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const GEMINI_MODEL: &str = "gemini-3-flash-preview";
    /// Maximum number of characters of HTML handed to the model
    pub const AI_FRAGMENT_LIMIT: usize = 5000;
    /// Type reported for search results without a `.Type` label
    pub const ANIME_TYPE: &str = "TV";
    pub const TRENDING_QUERY: &str = "2025";
    pub const TRENDING_LIMIT: usize = 12;
}
