use crate::config::CliConfig;
use clap::Subcommand;
use std::path::Path;
use winwallet_core::forms::JoinGameInput;
use winwallet_core::WinWalletError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show saved settings
    Show,
    /// Save settings used when no flag or environment variable is given
    Set {
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        socket_url: Option<String>,
        /// Ethereum address to play as
        #[arg(long)]
        address: Option<String>,
        /// HTTP request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

pub fn handle_config_command(
    cmd: ConfigCommands,
    mut config: CliConfig,
    path: &Path,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("Config file: {}", path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        ConfigCommands::Set {
            api_url,
            socket_url,
            address,
            timeout,
        } => {
            if let Some(address) = address {
                let address = JoinGameInput::new(address)
                    .validate()
                    .map_err(WinWalletError::Validation)?;
                config.ethereum_address = Some(address);
            }
            if api_url.is_some() {
                config.api_url = api_url;
            }
            if socket_url.is_some() {
                config.socket_url = socket_url;
            }
            if timeout.is_some() {
                config.request_timeout_secs = timeout;
            }

            config.save(path)?;
            println!("Saved settings to {}", path.display());
        }
    }

    Ok(())
}
