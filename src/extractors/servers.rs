//! Episode playback page: the `var videos = {...}` server map
//!
//! The map is keyed by audio track (`SUB`, and `DUB`/`LAT` for dubbed
//! servers), each holding an array of provider entries.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ServerTracks;
use crate::constants::markers;
use crate::document::Document;
use crate::embedded;
use crate::models::VideoServer;

use super::ExtractError;

const SUB_KEY: &str = "SUB";
const DUB_KEYS: &[&str] = &["DUB", "LAT"];

/// Provider entry as found in the server map
#[derive(Debug, Deserialize)]
struct RawServer {
    #[serde(default)]
    server: Option<String>,
    #[serde(default)]
    title: Option<String>,
    /// Embed code/URL, the field the player loads
    #[serde(default)]
    code: Option<String>,
    /// Download link, used only when `code` is absent
    #[serde(default)]
    url: Option<String>,
}

impl RawServer {
    fn into_video_server(self) -> Option<VideoServer> {
        let server = self.server.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
        let url = self
            .code
            .or(self.url)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())?;
        Some(VideoServer::new(server, self.title, url))
    }
}

/// Convert one track bucket, skipping entries that do not fit the expected shape
fn bucket_servers(bucket: Option<&Value>) -> Vec<VideoServer> {
    let Some(entries) = bucket.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match RawServer::deserialize(entry) {
            Ok(raw) => raw.into_video_server(),
            Err(e) => {
                debug!("Skipping server entry {}: {}", entry, e);
                None
            }
        })
        .collect()
}

/// Parse the video servers from an episode page
///
/// # Errors
/// * `NotFound` when no script carries the server map
/// * `Parse` when the map literal cannot be decoded as a JSON object
pub fn parse_video_servers(html: &str, tracks: ServerTracks) -> Result<Vec<VideoServer>, ExtractError> {
    let document = Document::parse(html);

    let script = document
        .script_containing(markers::VIDEOS)
        .ok_or_else(|| ExtractError::NotFound(format!("script marker `{}`", markers::VIDEOS)))?;

    let span = embedded::locate_videos(&script)?;
    let map: Map<String, Value> = embedded::decode(span)?;

    let mut servers = Vec::new();
    if tracks.includes_sub() {
        servers.extend(bucket_servers(map.get(SUB_KEY)));
    }
    if tracks.includes_dub() {
        let dub = DUB_KEYS.iter().find_map(|key| map.get(*key));
        servers.extend(bucket_servers(dub));
    }

    Ok(servers)
}
