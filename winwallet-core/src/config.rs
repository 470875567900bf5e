use crate::error::{Result, WinWalletError};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_SOCKET_URL: &str = "ws://localhost:5000/game";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
    pub socket_url: String,
    pub request_timeout: Duration,
    pub tick_interval: Duration,
    pub lobby_refresh_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            // build-time injection wins over the localhost defaults
            api_url: option_env!("API_URL").unwrap_or(DEFAULT_API_URL).to_string(),
            socket_url: option_env!("SOCKET_URL")
                .unwrap_or(DEFAULT_SOCKET_URL)
                .to_string(),
            request_timeout: Duration::from_secs(10),
            tick_interval: Duration::from_secs(1),
            lobby_refresh_interval: Duration::from_secs(15),
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, socket_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            socket_url: socket_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `API_URL` / `SOCKET_URL` from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overrides the URLs with `API_URL` / `SOCKET_URL` when they are set.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("API_URL") {
            self.api_url = url;
        }
        if let Ok(url) = std::env::var("SOCKET_URL") {
            self.socket_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(WinWalletError::config("API URL cannot be empty"));
        }

        if self.socket_url.is_empty() {
            return Err(WinWalletError::config("Socket URL cannot be empty"));
        }

        let api = self.api_base()?;
        if !matches!(api.scheme(), "http" | "https") {
            return Err(WinWalletError::config(format!(
                "API URL must use http or https, got '{}'",
                api.scheme()
            )));
        }

        let socket = Url::parse(&self.socket_url)
            .map_err(|e| WinWalletError::config(format!("Invalid socket URL: {}", e)))?;
        if !matches!(socket.scheme(), "ws" | "wss") {
            return Err(WinWalletError::config(format!(
                "Socket URL must use ws or wss, got '{}'",
                socket.scheme()
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(WinWalletError::config(
                "Request timeout must be greater than 0",
            ));
        }

        if self.tick_interval.is_zero() || self.lobby_refresh_interval.is_zero() {
            return Err(WinWalletError::config("Intervals must be greater than 0"));
        }

        Ok(())
    }

    /// API base with a trailing slash so relative joins keep any path prefix.
    pub fn api_base(&self) -> Result<Url> {
        let mut raw = self.api_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| WinWalletError::config(format!("Invalid API URL: {}", e)))
    }
}
