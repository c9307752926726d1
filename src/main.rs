use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parlor::{api::ApiClient, config::Config, repl, session::Session, transport::WsConnector};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing; keep the default quiet so chat output stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlor=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Items API at {}", config.api_base_url);
    tracing::info!("Chat backend at {}", config.chat_url);

    let api = ApiClient::new(config.api_base_url.clone());
    let connector = Arc::new(WsConnector::new(
        config.chat_url.clone(),
        config.connect_timeout,
    ));
    let session = Session::new(connector, config.auto_reconnect);

    repl::run(session, api).await;
}
