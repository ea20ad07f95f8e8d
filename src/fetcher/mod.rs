//! Fetcher module for retrieving remote HTML through a CORS proxy
//!
//! The proxy answers with a JSON envelope (`{"contents": "...", "status": {...}}`)
//! instead of the page itself; this module builds the proxy request and unwraps
//! the envelope into raw HTML. There is no retry: callers decide how to degrade.

use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::constants::endpoints;

/// Errors that can occur while fetching a page through the proxy
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientError(String),

    /// Network-related errors (connection timeout, DNS failure, etc.)
    #[error("Failed to connect to proxy: {0}")]
    NetworkError(String),

    /// HTTP non-success status, from the proxy or relayed from the target site
    #[error("Server returned status {0}")]
    HttpError(u16),

    /// Error reading response body
    #[error("Failed to read response body: {0}")]
    ResponseError(String),

    /// The proxy body was not a usable JSON envelope
    #[error("Malformed proxy envelope: {0}")]
    EnvelopeError(String),
}

/// JSON envelope returned by the proxy
#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    contents: Option<String>,
    #[serde(default)]
    status: Option<ProxyStatus>,
}

/// Upstream status relayed by the proxy
#[derive(Debug, Deserialize)]
struct ProxyStatus {
    #[serde(default)]
    http_code: Option<u16>,
}

/// Unwrap a proxy envelope body into the page HTML
pub fn unwrap_envelope(body: &str) -> Result<String, FetchError> {
    let envelope: ProxyEnvelope =
        serde_json::from_str(body).map_err(|e| FetchError::EnvelopeError(e.to_string()))?;

    if let Some(code) = envelope.status.and_then(|s| s.http_code) {
        if code >= 400 {
            return Err(FetchError::HttpError(code));
        }
    }

    envelope
        .contents
        .ok_or_else(|| FetchError::EnvelopeError("missing `contents` field".to_string()))
}

/// List of realistic user agents for rotation
const USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Chrome on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Firefox on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    // Safari on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// HTTP client that fetches HTML through the configured proxy
#[derive(Debug, Clone)]
pub struct HtmlFetcher {
    client: Client,
    proxy_url: String,
    rotate_user_agent: bool,
}

impl HtmlFetcher {
    /// Create a fetcher from the application configuration
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| FetchError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            proxy_url: config.proxy_url.clone(),
            rotate_user_agent: config.rotate_user_agent,
        })
    }

    /// Get a user agent, random if rotation is enabled
    fn user_agent(&self) -> &'static str {
        if self.rotate_user_agent {
            let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
            USER_AGENTS[idx]
        } else {
            USER_AGENTS[0]
        }
    }

    /// Proxy URL that retrieves `target_url`
    pub fn proxy_request_url(&self, target_url: &str) -> String {
        endpoints::proxy(&self.proxy_url, target_url)
    }

    /// Fetch the raw HTML of `target_url` through the proxy
    pub async fn fetch(&self, target_url: &str) -> Result<String, FetchError> {
        let request_url = self.proxy_request_url(target_url);
        debug!("Fetching {} via proxy", target_url);

        let response = self
            .client
            .get(&request_url)
            .header("User-Agent", self.user_agent())
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "es-ES,es;q=0.9,en;q=0.8")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::NetworkError("Connection timeout".to_string())
                } else if e.is_connect() {
                    FetchError::NetworkError("Failed to connect to server".to_string())
                } else {
                    FetchError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Proxy returned {} for {}", status, target_url);
            return Err(FetchError::HttpError(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::ResponseError(e.to_string()))?;

        let html = unwrap_envelope(&body)?;
        debug!("Fetched {} bytes of HTML from {}", html.len(), target_url);
        Ok(html)
    }
}
