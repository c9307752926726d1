//! Environment-derived configuration for both backend boundaries.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the items REST backend
    pub api_base_url: String,
    /// WebSocket URL of the chat backend
    pub chat_url: String,
    /// How long to wait for the WebSocket dial before giving up
    pub connect_timeout: Duration,
    /// Re-dial once after an unexpected connection drop
    pub auto_reconnect: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:7776".to_string(),
            chat_url: "ws://localhost:8000/ws".to_string(),
            connect_timeout: Duration::from_secs(20),
            auto_reconnect: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// backends' fixed local ports.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base_url = std::env::var("PARLOR_API_URL")
            .ok()
            .and_then(|url| {
                let trimmed = url.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or(defaults.api_base_url);

        let chat_url = std::env::var("PARLOR_CHAT_URL")
            .ok()
            .and_then(|url| {
                let trimmed = url.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or(defaults.chat_url);

        let connect_timeout = std::env::var("PARLOR_CONNECT_TIMEOUT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout);

        let auto_reconnect = std::env::var("PARLOR_AUTO_RECONNECT")
            .ok()
            .map(|s| matches!(s.trim(), "1" | "true" | "yes"))
            .unwrap_or(defaults.auto_reconnect);

        Self {
            api_base_url,
            chat_url,
            connect_timeout,
            auto_reconnect,
        }
    }
}
