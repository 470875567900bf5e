use super::{local_time, AppContext};
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use tokio::sync::mpsc;
use winwallet_core::screen::{watch_games, GameBoard};
use winwallet_core::sync::BoardUpdate;
use winwallet_core::{GameApi, GameId, Result};

#[derive(Subcommand)]
pub enum GamesCommands {
    /// List open games
    List,
    /// Show details for one game
    Show {
        /// Game ID
        game_id: GameId,
    },
    /// Keep the list on screen and update it as games are created
    Watch,
}

pub async fn handle_games_command(cmd: GamesCommands, ctx: &AppContext) -> Result<()> {
    match cmd {
        GamesCommands::List => {
            let mut board = GameBoard::new();
            board.reconcile(BoardUpdate::Snapshot(ctx.api.list_games().await?));
            print_board(&board);
        }

        GamesCommands::Show { game_id } => {
            let game = ctx.api.game_detail(game_id).await?;

            println!("Game {}:", game.id);
            println!("  Pot: ${:.2}", game.pot_size);
            if let Some(entry) = game.entry_value {
                println!("  Entry: {}", entry);
            }
            println!("  Players: {} / {}", game.players.len(), game.max_players);
            println!("  Starts: {}", local_time(game.start_time));
            if let Some(limit) = game.time_limit {
                println!("  Time limit: {} seconds", limit);
            }
            println!("  Questions: {}", game.questions.len());
            if game.is_complete {
                println!("  Status: complete");
            }

            if !game.players.is_empty() {
                println!();
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec!["Player", "Address", "Score"]);
                for player in &game.players {
                    let score = player
                        .score
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    table.add_row(vec![player.id.to_string(), player.ethereum_address.clone(), score]);
                }
                println!("{}", table);
            }
        }

        GamesCommands::Watch => {
            let channel = ctx.push_channel().await?;
            let (tx, mut rx) = mpsc::unbounded_channel();

            let printer = async move {
                while let Some(board) = rx.recv().await {
                    print_board(&board);
                    println!();
                }
            };
            let watcher = async { tokio::join!(watch_games(ctx.api.as_ref(), &channel, tx), printer).0 };

            tokio::select! {
                result = watcher => {
                    result?;
                    println!("Lost connection to the game server");
                }
                _ = tokio::signal::ctrl_c() => {}
            }
            channel.disconnect().await;
        }
    }

    Ok(())
}

fn print_board(board: &GameBoard) {
    if board.is_empty() {
        println!("No open games");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Pot", "Players", "Starts"]);
    for game in board.games() {
        table.add_row(vec![
            game.id.to_string(),
            format!("${:.2}", game.pot_size),
            format!("{} / {}", game.player_count(), game.max_players),
            local_time(game.start_time),
        ]);
    }
    println!("{}", table);
}
