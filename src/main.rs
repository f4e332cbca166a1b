use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use seat_manifest::{
    AppState,
    config::{Config, LogFormat},
    controllers,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let registry = tracing_subscriber::registry().with(EnvFilter::new(&config.app.rust_log));
    match config.app.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }

    info!("Starting Seat Manifest API ({})", config.app.environment);
    match &config.bridge.url {
        Some(url) => info!("Page bridge at {}", url),
        None => info!("BRIDGE_URL not set, cart endpoint will answer 503"),
    }

    // Create the shared application state
    let app_state = AppState::new(config.clone())?;

    // --- Start the web server ---
    let app = controllers::app(app_state);

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
