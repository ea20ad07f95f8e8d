//! Data models for the Anime Indexer
//!
//! This module contains the typed records produced by the extraction pipeline
//! and the response envelopes used by the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An anime entry from search results or a detail page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Anime {
    /// Slug taken from the last path segment of the source permalink
    pub id: String,
    pub title: String,
    /// Absolute poster URL
    pub poster: String,
    /// TV, OVA, Movie, ...
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub anime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
}

/// An episode of an anime, identified by `{anime_id}-{number}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    /// Episode number, starting at 1
    pub number: u32,
    pub anime_id: String,
}

impl Episode {
    pub fn new(anime_id: &str, number: u32) -> Self {
        Self {
            id: format!("{}-{}", anime_id, number),
            number,
            anime_id: anime_id.to_string(),
        }
    }
}

/// An embeddable video source for an episode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoServer {
    /// Provider name (e.g., "Streamtape")
    pub server: String,
    /// Display label, defaults to the provider name
    pub title: String,
    /// Embed URL or iframe source
    pub url: String,
}

impl VideoServer {
    /// Build a server entry, using the provider name when no label is given
    pub fn new(server: impl Into<String>, title: Option<String>, url: impl Into<String>) -> Self {
        let server = server.into();
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| server.clone());
        Self {
            server,
            title,
            url: url.into(),
        }
    }
}

/// Anime metadata together with its episodes in ascending order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimeInfo {
    pub anime: Anime,
    pub episodes: Vec<Episode>,
}

/// Request body for AI-assisted extraction from arbitrary HTML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// HTML fragment to analyse
    pub html: String,
    /// Servers already known; AI results are appended after these
    #[serde(default)]
    pub existing: Vec<VideoServer>,
}

/// Generic API response wrapper for successful responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the operation was successful (always true for this type)
    pub success: bool,
    /// The response payload
    pub data: T,
    /// ISO timestamp of when data was fetched
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// Create a new successful API response with the current timestamp
    pub fn new(data: T) -> Self {
        Self::with_timestamp(data, Utc::now())
    }

    /// Create a new successful API response with a custom timestamp
    pub fn with_timestamp(data: T, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: true,
            data,
            timestamp: timestamp.to_rfc3339(),
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Whether the operation was successful (always false for errors)
    pub success: bool,
    /// Error message describing what went wrong
    pub error: String,
    /// ISO timestamp of when the error occurred
    pub timestamp: String,
}

impl ApiError {
    /// Create a new API error response with the current timestamp
    pub fn new(error: impl Into<String>) -> Self {
        Self::with_timestamp(error, Utc::now())
    }

    /// Create a new API error response with a custom timestamp
    pub fn with_timestamp(error: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: timestamp.to_rfc3339(),
        }
    }
}
