//! Extraction of JSON literals embedded in inline scripts
//!
//! Two stages with separate failure kinds: a regex locator captures the literal
//! span next to a fixed marker, then a strict JSON decode turns the span into a
//! typed value.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use thiserror::Error;

use crate::constants::markers;

static EPISODES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(markers::EPISODES_PATTERN).expect("episodes pattern is valid"));

static VIDEOS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(markers::VIDEOS_PATTERN).expect("videos pattern is valid"));

#[derive(Error, Debug, PartialEq)]
pub enum EmbeddedError {
    /// The locator pattern did not match
    #[error("Marker not found: {0}")]
    MarkerMissing(&'static str),

    /// The captured span is not valid JSON for the expected shape
    #[error("Failed to decode embedded literal: {0}")]
    Decode(String),
}

/// Return capture group 1 of `pattern` in `text`
pub fn locate<'a>(text: &'a str, pattern: &Regex, marker: &'static str) -> Result<&'a str, EmbeddedError> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(EmbeddedError::MarkerMissing(marker))
}

/// Strictly decode a captured span
pub fn decode<T: DeserializeOwned>(span: &str) -> Result<T, EmbeddedError> {
    serde_json::from_str(span).map_err(|e| EmbeddedError::Decode(e.to_string()))
}

/// Inner elements of `var episodes = [...]`, without the outer brackets
pub fn locate_episodes(script: &str) -> Result<&str, EmbeddedError> {
    locate(script, &EPISODES_REGEX, markers::EPISODES)
}

/// Decode the episode entries captured by [`locate_episodes`]
pub fn decode_episodes<T: DeserializeOwned>(inner: &str) -> Result<Vec<T>, EmbeddedError> {
    decode(&format!("[{}]", inner))
}

/// Object literal of `var videos = {...}`
pub fn locate_videos(script: &str) -> Result<&str, EmbeddedError> {
    locate(script, &VIDEOS_REGEX, markers::VIDEOS)
}
