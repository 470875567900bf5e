pub mod admin;
pub mod games;
pub mod lobby;
pub mod play;
pub mod settings;

pub use admin::{handle_admin_command, AdminCommands};
pub use games::{handle_games_command, GamesCommands};
pub use lobby::handle_lobby_command;
pub use play::{handle_play_command, PlayArgs};
pub use settings::{handle_config_command, ConfigCommands};

use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use winwallet_core::{ApiClient, ClientConfig, PushChannel, Result, WinWalletError};

/// What every server-facing command needs.
pub struct AppContext {
    pub config: ClientConfig,
    pub api: Arc<ApiClient>,
    pub ethereum_address: Option<String>,
}

impl AppContext {
    pub fn new(config: ClientConfig, ethereum_address: Option<String>) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config)?);
        Ok(Self {
            config,
            api,
            ethereum_address,
        })
    }

    pub async fn push_channel(&self) -> Result<PushChannel> {
        PushChannel::connect(&self.config.socket_url).await
    }

    /// The address given on the command line, else the saved one.
    pub fn address(&self, explicit: Option<String>) -> Result<String> {
        explicit
            .or_else(|| self.ethereum_address.clone())
            .ok_or_else(|| {
                WinWalletError::config(
                    "No Ethereum address; pass --address or save one with 'winwallet config set --address'",
                )
            })
    }
}

pub(crate) fn prompt_failed(e: dialoguer::Error) -> WinWalletError {
    WinWalletError::internal(format!("Prompt failed: {}", e))
}

pub(crate) fn local_time(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "TBD".to_string(),
    }
}
