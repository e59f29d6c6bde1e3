//! ptz-relay server entry point.
//!
//! Builds one controller context from configuration, assembles its
//! commands, and serves the REST and WebSocket endpoints.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use ptz_relay::api;
use ptz_relay::app_state::AppState;
use ptz_relay::command::CommandAssembler;
use ptz_relay::config::RelayConfig;
use ptz_relay::domain::{Camera, CameraRoster, ControllerContext, LoggingTransport};
use ptz_relay::ws::BroadcastRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RelayConfig::from_env().map_err(|e| anyhow::anyhow!("configuration: {e}"))?;
    tracing::info!(addr = %config.listen_addr, "starting ptz-relay");

    // Build domain layer
    let roster = CameraRoster::from_cameras(config.cameras.iter().map(Camera::new));
    let context = ControllerContext::new(config.controller_name.clone(), roster);
    let registry = Arc::new(BroadcastRegistry::new(config.peer_queue_capacity));

    // Build command layer
    let assembler = CommandAssembler::new(Arc::clone(&registry), Arc::new(LoggingTransport));
    let app_state = AppState::new(Arc::clone(&registry), context, &assembler);

    // Build router
    let app = api::build_app(app_state, &config.ws_path);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, ws_path = %config.ws_path, "server listening");

    let shutdown_registry = Arc::clone(&registry);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "could not listen for shutdown signal");
            }
            tracing::info!("shutdown requested");
            shutdown_registry.close_all();
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
