//! Configuration module for the Anime Indexer
//!
//! Handles loading environment variables and application configuration.

use std::env;
use std::str::FromStr;

use crate::constants::defaults;

/// Which audio-track buckets of the episode server map are surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerTracks {
    /// Subtitled servers only
    #[default]
    Sub,
    /// Dubbed servers only
    Dub,
    /// Subtitled servers followed by dubbed servers
    Both,
}

impl ServerTracks {
    pub fn includes_sub(self) -> bool {
        matches!(self, ServerTracks::Sub | ServerTracks::Both)
    }

    pub fn includes_dub(self) -> bool {
        matches!(self, ServerTracks::Dub | ServerTracks::Both)
    }
}

impl FromStr for ServerTracks {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sub" => Ok(ServerTracks::Sub),
            "dub" | "lat" => Ok(ServerTracks::Dub),
            "both" | "all" => Ok(ServerTracks::Both),
            other => Err(format!("unknown server track selection: {}", other)),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Origin of the scraped anime site
    pub base_url: String,
    /// CORS proxy prefix; the encoded target URL is appended to it
    pub proxy_url: String,
    /// API key for the generative model, AI fallback is disabled without it
    pub gemini_api_key: Option<String>,
    /// Model identifier used for AI extraction
    pub gemini_model: String,
    /// Base URL of the generative model API
    pub gemini_api_base: String,
    /// Maximum characters of HTML submitted to the model
    pub ai_fragment_limit: usize,
    /// Server buckets read from the episode page
    pub server_tracks: ServerTracks,
    /// Query used to populate the trending list
    pub trending_query: String,
    /// Maximum number of trending entries
    pub trending_limit: usize,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Whether to rotate user agents between requests
    pub rotate_user_agent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: defaults::BASE_URL.to_string(),
            proxy_url: defaults::PROXY_URL.to_string(),
            gemini_api_key: None,
            gemini_model: defaults::GEMINI_MODEL.to_string(),
            gemini_api_base: defaults::GEMINI_API_BASE.to_string(),
            ai_fragment_limit: defaults::AI_FRAGMENT_LIMIT,
            server_tracks: ServerTracks::default(),
            trending_query: defaults::TRENDING_QUERY.to_string(),
            trending_limit: defaults::TRENDING_LIMIT,
            request_timeout_secs: 30,
            rotate_user_agent: true,
        }
    }
}

/// Read and parse an environment variable, keeping `default` when unset or invalid
fn parsed_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Every setting has a default; unparseable values fall back to it.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed_var("PORT", defaults.port),
            base_url: env::var("BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            proxy_url: env::var("PROXY_URL").unwrap_or(defaults.proxy_url),
            gemini_api_key,
            gemini_model: env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_api_base: env::var("GEMINI_API_BASE").unwrap_or(defaults.gemini_api_base),
            ai_fragment_limit: parsed_var("AI_FRAGMENT_LIMIT", defaults.ai_fragment_limit),
            server_tracks: parsed_var("SERVER_TRACKS", defaults.server_tracks),
            trending_query: env::var("TRENDING_QUERY").unwrap_or(defaults.trending_query),
            trending_limit: parsed_var("TRENDING_LIMIT", defaults.trending_limit),
            request_timeout_secs: parsed_var("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            rotate_user_agent: parsed_var("ROTATE_USER_AGENT", defaults.rotate_user_agent),
        }
    }
}
