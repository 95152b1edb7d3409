use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use places_bff::config::Config;
use places_bff::routes;
use places_bff::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration - RUST_LOG overrides server.log_filter
    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.yaml".to_string()),
        Some("conf.json".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let loaded = Config::load_first(&config_paths);
    let log_filter = loaded
        .as_ref()
        .map(|(config, _)| config.server.log_filter.clone())
        .unwrap_or_else(|_| Config::default().server.log_filter);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter)))
        .init();

    let (config, loaded_path) = loaded?;
    info!("Loaded configuration from: {}", loaded_path);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Initialize app state
    let app_state = AppState::new(config).await?;
    let app = routes::create_routes(app_state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
