//! API Routes module for the Anime Indexer
//!
//! HTTP handlers exposing the extraction pipeline to the front-end.

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Anime, AnimeInfo, ApiError, ApiResponse, Episode, ExtractRequest, VideoServer};
use crate::pipeline::Pipeline;

/// Application state shared across handlers
pub struct AppState {
    pub pipeline: Pipeline,
    pub config: Config,
}

/// Query parameters for search endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SearchQuery {
    /// Search keyword
    pub q: Option<String>,
}

/// GET /api/search - Search for anime
///
/// Query parameter: q (required) - search keyword.
/// Scraping failures produce an empty list rather than an error.
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "anime",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results (empty when nothing could be extracted)", body = Vec<Anime>),
        (status = 400, description = "Bad request - search query is required", body = ApiError)
    )
)]
pub async fn search_anime(
    data: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let keyword = match &query.q {
        Some(q) if !q.trim().is_empty() => q.trim(),
        _ => {
            return HttpResponse::BadRequest()
                .json(ApiError::new("Search query is required"));
        }
    };

    info!("Searching for anime: {}", keyword);
    let results = data.pipeline.search_animes(keyword).await;
    HttpResponse::Ok().json(ApiResponse::new(results))
}

/// GET /api/trending - Highlighted anime for the home page
#[utoipa::path(
    get,
    path = "/api/trending",
    tag = "anime",
    responses(
        (status = 200, description = "Trending anime (empty when nothing could be extracted)", body = Vec<Anime>)
    )
)]
pub async fn get_trending(data: web::Data<AppState>) -> impl Responder {
    let results = data.pipeline.trending().await;
    HttpResponse::Ok().json(ApiResponse::new(results))
}

/// GET /api/anime/{slug} - Get anime detail with episodes
#[utoipa::path(
    get,
    path = "/api/anime/{slug}",
    tag = "anime",
    params(
        ("slug" = String, Path, description = "Anime slug identifier")
    ),
    responses(
        (status = 200, description = "Anime detail retrieved successfully", body = AnimeInfo),
        (status = 404, description = "Anime not found", body = ApiError),
        (status = 502, description = "Source site or proxy unavailable", body = ApiError),
        (status = 500, description = "Source page could not be decoded", body = ApiError)
    )
)]
pub async fn get_anime_by_slug(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    info!("Fetching anime detail: {}", slug);

    let info = data.pipeline.get_anime_info(&slug).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(info)))
}

/// GET /api/anime/{slug}/episodes/{number}/servers - Video servers of an episode
#[utoipa::path(
    get,
    path = "/api/anime/{slug}/episodes/{number}/servers",
    tag = "anime",
    params(
        ("slug" = String, Path, description = "Anime slug identifier"),
        ("number" = u32, Path, description = "Episode number, starting at 1")
    ),
    responses(
        (status = 200, description = "Video servers (empty when nothing could be extracted)", body = Vec<VideoServer>)
    )
)]
pub async fn get_episode_servers(
    data: web::Data<AppState>,
    path: web::Path<(String, u32)>,
) -> impl Responder {
    let (slug, number) = path.into_inner();
    info!("Fetching servers: {} episode {}", slug, number);

    let servers = data.pipeline.get_video_servers(&slug, number).await;
    HttpResponse::Ok().json(ApiResponse::new(servers))
}

/// POST /api/extract - AI-assisted server extraction from arbitrary HTML
///
/// Results are appended after `existing`; nothing is replaced or deduplicated.
#[utoipa::path(
    post,
    path = "/api/extract",
    tag = "ai",
    request_body = ExtractRequest,
    responses(
        (status = 200, description = "Existing servers followed by AI-extracted ones", body = Vec<VideoServer>),
        (status = 400, description = "Bad request - html is required", body = ApiError)
    )
)]
pub async fn extract_servers(
    data: web::Data<AppState>,
    body: web::Json<ExtractRequest>,
) -> AppResult<HttpResponse> {
    let ExtractRequest { html, existing } = body.into_inner();
    if html.trim().is_empty() {
        return Err(AppError::validation("HTML fragment is required"));
    }

    info!("AI extraction requested for {} bytes of HTML", html.len());
    let servers = data.pipeline.append_fallback(existing, &html).await;
    Ok(HttpResponse::Ok().json(ApiResponse::new(servers)))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Anime Indexer API",
        version = "0.1.0",
        description = "Anime discovery API scraping AnimeFLV through a CORS proxy, with AI fallback extraction",
        license(
            name = "MIT"
        )
    ),
    paths(
        search_anime,
        get_trending,
        get_anime_by_slug,
        get_episode_servers,
        extract_servers
    ),
    components(
        schemas(
            Anime,
            Episode,
            VideoServer,
            AnimeInfo,
            ExtractRequest,
            ApiError,
            SearchQuery
        )
    ),
    tags(
        (name = "anime", description = "Scraped anime data endpoints"),
        (name = "ai", description = "Generative model fallback extraction")
    )
)]
pub struct ApiDoc;

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/search", web::get().to(search_anime))
            .route("/trending", web::get().to(get_trending))
            .route("/anime/{slug}", web::get().to(get_anime_by_slug))
            .route(
                "/anime/{slug}/episodes/{number}/servers",
                web::get().to(get_episode_servers),
            )
            .route("/extract", web::post().to(extract_servers)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    fn app_state() -> web::Data<AppState> {
        // unreachable proxy: every fetch fails fast
        let config = Config {
            proxy_url: "http://127.0.0.1:9/get?url=".to_string(),
            request_timeout_secs: 2,
            ..Config::default()
        };
        web::Data::new(AppState {
            pipeline: Pipeline::new(&config).unwrap(),
            config,
        })
    }

    #[actix_web::test]
    async fn test_search_requires_query() {
        let app = test::init_service(
            App::new().app_data(app_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/search?q=%20").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_search_failure_is_empty_list() {
        let app = test::init_service(
            App::new().app_data(app_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/search?q=naruto").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], Value::Array(vec![]));
    }

    #[actix_web::test]
    async fn test_detail_invalid_slug_is_not_found() {
        let app = test::init_service(
            App::new().app_data(app_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/anime/bad%20slug").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_detail_fetch_failure_is_bad_gateway() {
        let app = test::init_service(
            App::new().app_data(app_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/anime/demo").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn test_extract_requires_html() {
        let app = test::init_service(
            App::new().app_data(app_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/extract")
            .set_json(serde_json::json!({ "html": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_extract_without_ai_returns_existing() {
        let app = test::init_service(
            App::new().app_data(app_state()).configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/extract")
            .set_json(serde_json::json!({
                "html": "<iframe src=\"https://ok.ru/videoembed/1\"></iframe>",
                "existing": [{ "server": "mega", "title": "MEGA", "url": "https://mega.nz/e/1" }]
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"][0]["server"], "mega");
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }
}
