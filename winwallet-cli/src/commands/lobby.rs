use super::AppContext;
use std::io::Write;
use tokio::sync::mpsc;
use winwallet_core::screen::{run_lobby, LobbyChange, LobbyEvent, LobbyExit, LobbyOptions, LobbyView};
use winwallet_core::{Clock, GameId, PushChannel, Result};

pub async fn handle_lobby_command(game_id: GameId, ctx: &AppContext) -> Result<LobbyExit> {
    let channel = ctx.push_channel().await?;
    let exit = wait_in_lobby(game_id, ctx, &channel).await?;
    if matches!(exit, LobbyExit::Started | LobbyExit::StartTimeReached) {
        println!("Run 'winwallet play {}' to answer.", game_id);
    }
    channel.disconnect().await;
    Ok(exit)
}

/// Shows the lobby until the game starts, the connection drops, or Ctrl-C.
pub(crate) async fn wait_in_lobby(
    game_id: GameId,
    ctx: &AppContext,
    channel: &PushChannel,
) -> Result<LobbyExit> {
    let options = LobbyOptions {
        tick_interval: ctx.config.tick_interval,
        refresh_interval: ctx.config.lobby_refresh_interval,
    };
    let (tx, mut rx) = mpsc::unbounded_channel();

    let printer = async move {
        while let Some((view, event)) = rx.recv().await {
            show(&view, event);
        }
    };
    let lobby = async {
        tokio::join!(
            run_lobby(ctx.api.as_ref(), channel, game_id, Clock::system(), options, tx),
            printer
        )
        .0
    };

    let exit = tokio::select! {
        exit = lobby => exit?,
        _ = tokio::signal::ctrl_c() => LobbyExit::Closed,
    };
    println!();
    Ok(exit)
}

fn show(view: &LobbyView, event: LobbyEvent) {
    match event {
        LobbyEvent::Countdown(text) => {
            if !text.is_empty() {
                print!("\rStarts in {}   ", text);
                let _ = std::io::stdout().flush();
            }
        }
        LobbyEvent::Updated(LobbyChange::Game) => {
            if let Some(game) = view.game() {
                println!(
                    "\rGame {}: pot ${:.2}, {} / {} players",
                    game.id,
                    game.pot_size,
                    view.player_count(),
                    game.max_players
                );
            }
        }
        LobbyEvent::Updated(LobbyChange::Players) => {
            println!("\r{} players in the lobby", view.player_count());
        }
        LobbyEvent::Updated(LobbyChange::Started) => {
            println!("\rThe game has started!");
        }
        LobbyEvent::Updated(LobbyChange::None) => {}
        LobbyEvent::Alert { title, message } => {
            eprintln!("\r{}: {}", title, message);
        }
    }
}
