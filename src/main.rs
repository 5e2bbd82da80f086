// Main entry point - Dependency injection and server setup
use std::sync::Arc;

use solar_telemetry::application::series_service::SeriesService;
use solar_telemetry::application::topic_service::TopicService;
use solar_telemetry::infrastructure::config::load_config;
use solar_telemetry::infrastructure::sql_repository::SqlRepository;
use solar_telemetry::presentation::app_state::AppState;
use solar_telemetry::presentation::router::build_router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_config()?;

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    // Create repository (infrastructure layer)
    let repository = SqlRepository::connect(&config.database).await?;
    repository.migrate().await?;
    let repository = Arc::new(repository);

    // Create services (application layer)
    let topic_service = TopicService::new(repository.clone());
    let series_service = SeriesService::new(repository);

    let state = Arc::new(AppState {
        topic_service,
        series_service,
        default_sample_rate: config.query.default_sample_rate()?,
    });

    // Build router (presentation layer)
    let router = build_router(state);

    let addr = config.server.addr()?;
    tracing::info!("Starting solar-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
