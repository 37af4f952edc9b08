// Calendar Bridge Server
//
// Google OAuth broker and Calendar facade for the frontend application

use calendar_bridge::{start_server, BridgeConfig};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BridgeConfig::from_env()?;

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let host = args.get(1).map(|s| s.as_str()).unwrap_or("127.0.0.1");
    let port = args.get(2)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8000);

    tracing::info!("[OK] Google OAuth configured: {}", config.client_id);
    tracing::info!("[OK] Redirect URI: {}", config.redirect_uri);
    tracing::info!("[OK] Frontend URL: {}", config.frontend_url);

    start_server(config, host, port).await?;

    Ok(())
}
