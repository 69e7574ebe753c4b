use load_planner::api::{self, ApiState};
use load_planner::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            tracing::warn!("Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    let catalog = app_config.planner.load_catalog();
    tracing::info!(containers = catalog.len(), "Load planner starting");

    let state = ApiState::new(catalog, app_config.planner.clone());
    if let Err(err) = api::start_api_server(app_config.api.clone(), state).await {
        tracing::error!("Server stopped: {}", err);
        std::process::exit(1);
    }
}
