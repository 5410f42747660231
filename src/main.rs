//! Debt Collector Pro server entry point.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use debt_collector_pro::adapters::ai::GeminiProvider;
use debt_collector_pro::adapters::http::{app_router, TrainingAppState};
use debt_collector_pro::application::SessionController;
use debt_collector_pro::config::AppConfig;
use debt_collector_pro::ports::AIProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    let provider = GeminiProvider::new(config.ai.gemini_config()?)?;
    let info = provider.provider_info();
    tracing::info!(provider = %info.name, model = %info.model, "AI provider ready");

    let provider: Arc<dyn AIProvider> = Arc::new(provider);
    let controller = Arc::new(SessionController::new(provider));
    let state = TrainingAppState::new(controller, config.scenario.clone());
    let app = app_router(state, &config.server.cors_origins_list());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
