//! Anime Indexer API Server
//!
//! Main entry point for the anime indexer REST API service.

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use anime_indexer::config::Config;
use anime_indexer::pipeline::Pipeline;
use anime_indexer::routes::{configure_routes, ApiDoc, AppState};

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_address = format!("{}:{}", config.host, config.port);

    let pipeline = Pipeline::new(&config).map_err(|e| {
        error!("Failed to initialise extraction pipeline: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    info!(
        "Scraping {} through proxy {} (server tracks: {:?})",
        config.base_url, config.proxy_url, config.server_tracks
    );

    let app_state = web::Data::new(AppState {
        pipeline,
        config: config.clone(),
    });

    info!("Starting Anime Indexer API server on {}", bind_address);

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .route("/health", web::get().to(health_check))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
