//! Extraction pipeline: fetch, parse, extract and, on request, AI fallback
//!
//! The pipeline holds no mutable state. Each call is independent and runs its
//! stage to completion. The failure policy per operation is:
//!
//! | operation            | on error                    |
//! |----------------------|-----------------------------|
//! | `search_animes`      | logged, empty vec           |
//! | `get_anime_info`     | propagated                  |
//! | `get_video_servers`  | logged, empty vec           |
//! | `extract_from_fragment` | logged, empty vec        |

use tracing::{error, info, warn};

use crate::ai::AiExtractor;
use crate::config::{Config, ServerTracks};
use crate::constants::endpoints;
use crate::error::{AppError, AppResult};
use crate::extractors::{
    parse_anime_detail, parse_search_results, parse_video_servers, validate_slug, ExtractError,
};
use crate::fetcher::HtmlFetcher;
use crate::models::{Anime, AnimeInfo, VideoServer};

/// One extraction step, identified by the data it needs
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Search { query: String },
    Detail { slug: String },
    Servers { slug: String, number: u32 },
    Fallback { existing: Vec<VideoServer>, fragment: String },
}

/// Typed result of a [`Stage`]
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    Animes(Vec<Anime>),
    Info(AnimeInfo),
    Servers(Vec<VideoServer>),
}

/// Append fallback results after the existing ones, without deduplication
pub fn merge_servers(mut existing: Vec<VideoServer>, extra: Vec<VideoServer>) -> Vec<VideoServer> {
    existing.extend(extra);
    existing
}

/// Composition of fetcher, extractors and AI fallback
#[derive(Clone)]
pub struct Pipeline {
    fetcher: HtmlFetcher,
    ai: AiExtractor,
    base_url: String,
    server_tracks: ServerTracks,
    trending_query: String,
    trending_limit: usize,
}

impl Pipeline {
    pub fn new(config: &Config) -> AppResult<Self> {
        let fetcher = HtmlFetcher::new(config).map_err(|e| AppError::internal(e.to_string()))?;
        let ai = AiExtractor::new(config).map_err(|e| AppError::internal(e.to_string()))?;

        if !ai.is_enabled() {
            warn!("No model API key configured, AI extraction will return no servers");
        }

        Ok(Self {
            fetcher,
            ai,
            base_url: config.base_url.clone(),
            server_tracks: config.server_tracks,
            trending_query: config.trending_query.clone(),
            trending_limit: config.trending_limit,
        })
    }

    /// Run a single stage
    pub async fn run(&self, stage: Stage) -> Result<StageOutput, ExtractError> {
        match stage {
            Stage::Search { query } => Ok(StageOutput::Animes(self.search_animes(&query).await)),
            Stage::Detail { slug } => self.get_anime_info(&slug).await.map(StageOutput::Info),
            Stage::Servers { slug, number } => Ok(StageOutput::Servers(
                self.get_video_servers(&slug, number).await,
            )),
            Stage::Fallback { existing, fragment } => Ok(StageOutput::Servers(
                self.append_fallback(existing, &fragment).await,
            )),
        }
    }

    /// Search the site, empty when anything fails
    pub async fn search_animes(&self, query: &str) -> Vec<Anime> {
        match self.try_search_animes(query).await {
            Ok(results) => {
                info!("Search {:?} returned {} anime", query, results.len());
                results
            }
            Err(e) => {
                error!("Failed to search anime {:?}: {}", query, e);
                Vec::new()
            }
        }
    }

    pub async fn try_search_animes(&self, query: &str) -> Result<Vec<Anime>, ExtractError> {
        let html = self
            .fetcher
            .fetch(&endpoints::search(&self.base_url, query))
            .await?;
        Ok(parse_search_results(&html, &self.base_url))
    }

    /// Highlighted anime for the home listing
    pub async fn trending(&self) -> Vec<Anime> {
        let mut results = self.search_animes(&self.trending_query).await;
        results.truncate(self.trending_limit);
        results
    }

    /// Anime metadata and episodes; errors propagate to the caller
    pub async fn get_anime_info(&self, slug: &str) -> Result<AnimeInfo, ExtractError> {
        let slug = validate_slug(slug)?;
        let html = self
            .fetcher
            .fetch(&endpoints::anime(&self.base_url, slug))
            .await
            .inspect_err(|e| error!("Failed to fetch anime {}: {}", slug, e))?;

        let info = parse_anime_detail(&html, slug, &self.base_url)?;
        info!("Loaded anime {} with {} episodes", slug, info.episodes.len());
        Ok(info)
    }

    /// Video servers of an episode, empty when anything fails
    pub async fn get_video_servers(&self, slug: &str, number: u32) -> Vec<VideoServer> {
        match self.try_video_servers(slug, number).await {
            Ok(servers) => {
                info!("Found {} servers for {} episode {}", servers.len(), slug, number);
                servers
            }
            Err(e) => {
                warn!("No servers for {} episode {}: {}", slug, number, e);
                Vec::new()
            }
        }
    }

    pub async fn try_video_servers(
        &self,
        slug: &str,
        number: u32,
    ) -> Result<Vec<VideoServer>, ExtractError> {
        let slug = validate_slug(slug)?;
        if number == 0 {
            return Err(ExtractError::NotFound("episode 0".to_string()));
        }

        let html = self
            .fetcher
            .fetch(&endpoints::episode(&self.base_url, slug, number))
            .await?;
        parse_video_servers(&html, self.server_tracks)
    }

    /// AI extraction over arbitrary HTML, empty when anything fails
    pub async fn extract_from_fragment(&self, html: &str) -> Vec<VideoServer> {
        self.ai.extract_from_fragment(html).await
    }

    /// AI extraction appended after `existing`
    pub async fn append_fallback(&self, existing: Vec<VideoServer>, fragment: &str) -> Vec<VideoServer> {
        let extra = self.extract_from_fragment(fragment).await;
        merge_servers(existing, extra)
    }
}
