mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::{CliConfig, UrlOverrides};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use winwallet_core::{GameId, WinWalletError};

#[derive(Parser)]
#[command(name = "winwallet")]
#[command(about = "Win the Wallet - timed trivia games with a shared pot")]
#[command(version)]
struct Cli {
    /// Game server HTTP base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Push channel URL (ws:// or wss://)
    #[arg(long, global = true)]
    socket_url: Option<String>,

    /// Config file to use instead of the default one
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse open games
    #[command(subcommand)]
    Games(commands::GamesCommands),

    /// Wait in a game's lobby until it starts
    Lobby {
        /// Game ID
        game_id: GameId,
    },

    /// Play a game: wait for the start, answer, submit
    Play(commands::PlayArgs),

    /// Game administration
    #[command(subcommand)]
    Admin(commands::AdminCommands),

    /// Saved settings
    #[command(subcommand)]
    Config(commands::ConfigCommands),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; stdout belongs to the game screens
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "winwallet={},winwallet_core={}",
            log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.unwrap_or_else(CliConfig::default_path);
    let saved = CliConfig::load(&config_path)?;

    let flags = UrlOverrides {
        api_url: cli.api_url,
        socket_url: cli.socket_url,
    };

    let result = match cli.command {
        Commands::Config(cmd) => {
            commands::handle_config_command(cmd, saved, &config_path)?;
            return Ok(());
        }
        command => {
            let client_config = saved.client_config(&flags);
            match commands::AppContext::new(client_config, saved.ethereum_address.clone()) {
                Ok(ctx) => run(command, &ctx).await,
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        match e {
            WinWalletError::GameNotFound { game_id } => {
                eprintln!("Error: Game {} not found", game_id);
                eprintln!("Use 'winwallet games list' to see open games");
            }
            WinWalletError::Validation(errors) => {
                eprintln!("Error: Please fix the following:");
                for error in errors {
                    eprintln!("  {}: {}", error.field, error.message);
                }
            }
            WinWalletError::Rejected(message) => {
                eprintln!("Error: {}", message);
            }
            ref e if e.is_network() => {
                eprintln!("Error: {}", e);
                eprintln!("Check that the game server is reachable");
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, ctx: &commands::AppContext) -> winwallet_core::Result<()> {
    match command {
        Commands::Games(cmd) => commands::handle_games_command(cmd, ctx).await,
        Commands::Lobby { game_id } => commands::handle_lobby_command(game_id, ctx)
            .await
            .map(|_| ()),
        Commands::Play(args) => commands::handle_play_command(args, ctx).await,
        Commands::Admin(cmd) => commands::handle_admin_command(cmd, ctx).await,
        Commands::Config(_) => Ok(()),
    }
}
