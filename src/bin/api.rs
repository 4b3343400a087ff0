use financial_coach::{api::start_server, config::CoachConfig, Orchestrator};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = CoachConfig::from_env();

    info!("Financial Coach - API Server");
    info!("Port: {}", config.port);
    if !config.llm_enabled() {
        info!("GOOGLE_API_KEY not set, running in rule-based demo mode");
    }

    let orchestrator = Arc::new(Orchestrator::from_config(&config)?);

    info!("Orchestrator initialized");
    info!("Starting API server...");

    start_server(orchestrator, config.port).await?;

    Ok(())
}
