//! Anime Indexer Library
//!
//! This library scrapes anime search results, detail pages and episode video
//! servers from AnimeFLV through a CORS proxy, falls back to a generative model
//! for extracting servers from arbitrary HTML, and exposes everything through
//! REST API endpoints.

pub mod ai;
pub mod config;
pub mod constants;
pub mod document;
pub mod embedded;
pub mod error;
pub mod extractors;
pub mod fetcher;
pub mod models;
pub mod pipeline;
pub mod routes;
