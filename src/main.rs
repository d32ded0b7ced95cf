// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use footfall_timeline::application::assistant_service::AssistantService;
use footfall_timeline::application::playback_service::PlaybackService;
use footfall_timeline::application::timeline_service::TimelineService;
use footfall_timeline::infrastructure::air_quality_repository::CsvAirQualityRepository;
use footfall_timeline::infrastructure::backend_client::HttpQuestionBackend;
use footfall_timeline::infrastructure::config::load_app_config;
use footfall_timeline::infrastructure::footfall_repository::{
    FootfallLocation, JsonFootfallRepository,
};
use footfall_timeline::presentation::{self, app_state::AppState};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create repositories (infrastructure layer)
    let footfall = Arc::new(JsonFootfallRepository::new(FootfallLocation::parse(
        &config.source.footfall,
    )));
    let backend = Arc::new(HttpQuestionBackend::new(config.backend.base_url.clone()));

    // Create services (application layer)
    let mut timelines = TimelineService::new(
        footfall,
        config.location_directory(),
        config.stations(),
        config.index_options()?,
    );
    if let Some(dir) = &config.source.air_quality_dir {
        timelines = timelines.with_air_quality(Arc::new(CsvAirQualityRepository::new(dir.clone())));
    }
    let playback = PlaybackService::new(config.playback_settings());
    let assistant = AssistantService::new(backend, playback.clone(), config.backend.top_k);

    // Initial load; a failure leaves the session in its error state until /timeline/reload
    playback.reload(&timelines).await;

    let state = Arc::new(AppState {
        playback: playback.clone(),
        timelines,
        assistant,
    });

    // Build router (presentation layer)
    let router = presentation::router(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting footfall-timeline service on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    playback.shutdown().await;
    Ok(())
}
