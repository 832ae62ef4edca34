use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use acadical::api::{self, app_state::AppState};
use acadical::config::loader::ConfigLoader;
use acadical::llm::create_calendar_model;
use acadical::observability::{AppMetrics, ObservabilityState, create_observability_router};
use acadical::services::{create_chat_service, create_session_service};
use acadical::storage::create_session_store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.structured {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting AcadiCal...");

    ConfigLoader::validate(&config)?;
    info!("Configuration loaded successfully");

    // 凭证缺失不阻止启动，首次上游调用时才会失败
    if config.gemini.api_key.is_empty() {
        error!("GEMINI_API_KEY is missing from environment variables; questions will fail until it is configured");
    }

    let store = create_session_store();
    let metrics = AppMetrics::default();

    let model = create_calendar_model(&config.gemini)?;
    info!(model = %config.gemini.model, "Upstream model client initialized");

    let session_service = create_session_service(store.clone(), config.chat.clone());
    let chat_service = create_chat_service(store.clone(), model, config.chat.clone());
    info!("Services initialized");

    let app_state = AppState::new(store.clone(), session_service, chat_service, metrics.clone());
    info!("Application state created");

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        metrics,
        store,
    ));
    let api_router = api::create_router(app_state);
    let router = create_observability_router(observability_state).merge(api_router);
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
