//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;

use crate::ws::registry::DEFAULT_QUEUE_CAPACITY;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Path of the WebSocket push endpoint.
    pub ws_path: String,

    /// Depth of each peer's outbound message queue.
    pub peer_queue_capacity: usize,

    /// Display name of the controller context.
    pub controller_name: String,

    /// Names of the cameras the roster starts with, in roster order.
    pub cameras: Vec<String>,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let ws_path = normalize_path(
            &std::env::var("WS_PATH").unwrap_or_else(|_| "/ws".to_string()),
        );
        let peer_queue_capacity = parse_env("PEER_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY).max(1);
        let controller_name =
            std::env::var("CONTROLLER_NAME").unwrap_or_else(|_| "Controller 1".to_string());
        let cameras = parse_list(
            &std::env::var("CAMERAS").unwrap_or_else(|_| "Cam1,Cam2,Cam3".to_string()),
        );

        Ok(Self {
            listen_addr,
            ws_path,
            peer_queue_capacity,
            controller_name,
            cameras,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Ensures the path starts with exactly one `/`.
fn normalize_path(raw: &str) -> String {
    format!("/{}", raw.trim().trim_start_matches('/'))
}
