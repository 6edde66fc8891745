//! # Chat Hub
//!
//! Application entry point. Initializes logging, loads configuration,
//! connects storage and serves HTTP and WebSocket traffic until a shutdown
//! signal arrives.

use anyhow::Result;
use tracing::info;

use chat_hub::config::Settings;
use chat_hub::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    chat_hub::telemetry::init_tracing();

    info!("Starting Chat Hub...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        storage = ?settings.storage.backend,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    info!("Server stopped");
    Ok(())
}
