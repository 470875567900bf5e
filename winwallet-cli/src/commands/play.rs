use super::lobby::wait_in_lobby;
use super::AppContext;
use clap::Args;
use dialoguer::Input;
use std::io::Write;
use std::time::Duration;
use winwallet_core::forms::JoinGameInput;
use winwallet_core::lifecycle::{format_timer, Tick};
use winwallet_core::screen::LobbyExit;
use winwallet_core::session::SessionCommands;
use winwallet_core::types::Question;
use winwallet_core::{
    Clock, GameId, GameSession, Phase, Result, SessionEvent, TransitionCause, WinWalletError,
};

#[derive(Args)]
pub struct PlayArgs {
    /// Game ID
    game_id: GameId,

    /// Ethereum address to play as (defaults to the saved one)
    #[arg(short, long)]
    address: Option<String>,

    /// Join the game before playing
    #[arg(long)]
    join: bool,

    /// Wait in the lobby until the game starts
    #[arg(long)]
    lobby: bool,
}

pub async fn handle_play_command(args: PlayArgs, ctx: &AppContext) -> Result<()> {
    let game_id = args.game_id;
    let address = ctx.address(args.address)?;

    if args.join {
        ctx.api
            .join_game(game_id, &JoinGameInput::new(address.clone()))
            .await?;
        println!("Joined game {} as {}", game_id, address);
    }

    // without a push channel the local timers still run the game
    let channel = match ctx.push_channel().await {
        Ok(channel) => Some(channel),
        Err(e) => {
            tracing::warn!("Playing without live updates: {}", e);
            None
        }
    };

    let lobby_exit = match (args.lobby, channel.as_ref()) {
        (true, Some(channel)) => Some(wait_in_lobby(game_id, ctx, channel).await?),
        _ => None,
    };
    if lobby_exit == Some(LobbyExit::Closed) {
        return Ok(());
    }

    let subscription = match channel.as_ref() {
        Some(channel) => {
            let subscription = channel.subscribe();
            channel.join(game_id)?;
            Some(subscription)
        }
        None => None,
    };

    let (mut session, handle) = GameSession::new(
        ctx.api.clone(),
        game_id,
        address,
        Clock::system(),
        ctx.config.tick_interval,
    );
    // the lobby already consumed the game_started push
    if lobby_exit == Some(LobbyExit::Started) {
        session.mark_started();
    }
    // held until the session ends; dropping every sender detaches it
    let (commands, mut events) = handle.into_parts();
    let task = tokio::spawn(session.run(subscription));

    let mut questions: Vec<Question> = Vec::new();
    let mut active = false;
    let mut prompted = false;
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Countdown(tick) => show_tick(tick),
            SessionEvent::Questions(loaded) => {
                questions = loaded;
                if active && !prompted {
                    prompted = true;
                    spawn_prompts(questions.clone(), commands.clone());
                }
            }
            SessionEvent::PhaseChanged(transition) => match (transition.to, transition.cause) {
                (Phase::Active, _) => {
                    println!("\rThe game has started! Answer the questions below.");
                    active = true;
                    if questions.is_empty() {
                        // fetch failed earlier; prompts start once they arrive
                        if let Err(e) = commands.refresh().await {
                            tracing::warn!("Could not request game details: {}", e);
                        }
                    } else {
                        prompted = true;
                        spawn_prompts(questions.clone(), commands.clone());
                    }
                }
                (Phase::Submitted, TransitionCause::TimeExpired) => {
                    println!();
                    println!("Time's up! Submitting your answers...");
                }
                (Phase::Submitted, _) => println!("Submitting your answers..."),
                (Phase::Waiting, _) => {}
            },
            SessionEvent::Submitted(response) => {
                println!("{}", response.message);
                if let Some(score) = response.score {
                    println!("Score: {}", score);
                }
                if response.won() {
                    println!("You won the pot!");
                }
            }
            SessionEvent::Alert { title, message } => eprintln!("{}: {}", title, message),
            SessionEvent::ScoreUpdate { player_id, score } => {
                println!("Player {} scored {}", player_id, score)
            }
            SessionEvent::GameComplete { winner_id } => {
                println!("Game complete, winner: player {}", winner_id)
            }
        }
    }
    drop(commands);

    let report = task
        .await
        .map_err(|e| WinWalletError::internal(format!("Game session failed: {}", e)))?;
    if report.final_phase != Phase::Submitted {
        println!("Left game {} before submitting", report.game_id);
    }
    if let Some(channel) = channel {
        channel.disconnect().await;
    }

    Ok(())
}

fn show_tick(tick: Tick) {
    let Some(remaining) = tick.time_remaining else {
        return;
    };
    match tick.phase {
        Phase::Waiting => {
            print!("\rStarts in {}   ", format_timer(remaining));
            let _ = std::io::stdout().flush();
        }
        // a running line would trample the answer prompts
        Phase::Active => {
            let secs = remaining.as_secs();
            if matches!(secs, 60 | 30 | 10) {
                println!();
                println!("{} left", format_timer(Duration::from_secs(secs)));
            }
        }
        Phase::Submitted => {}
    }
}

/// Prompts run on a plain thread: a blocked stdin read must not hold up the
/// runtime, and the thread is abandoned if time runs out first.
fn spawn_prompts(questions: Vec<Question>, commands: SessionCommands) {
    std::thread::spawn(move || {
        for (index, question) in questions.iter().enumerate() {
            let answer: String = match Input::new()
                .with_prompt(format!("{}. {}", index + 1, question.phrase))
                .allow_empty(true)
                .interact_text()
            {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::warn!("Answer prompt failed: {}", e);
                    return;
                }
            };
            if commands.blocking_answer(index, answer).is_err() {
                return;
            }
        }
        let _ = commands.blocking_submit();
    });
}
