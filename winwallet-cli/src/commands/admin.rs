use super::{prompt_failed, AppContext};
use chrono::Utc;
use clap::Subcommand;
use dialoguer::Confirm;
use winwallet_core::forms::CreateGameInput;
use winwallet_core::{GameApi, GameId, Result, WinWalletError};

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Start a game now instead of at its scheduled time
    Start {
        /// Game ID
        game_id: GameId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Create a new game
    Create {
        /// Seconds players get to answer (60-3600)
        #[arg(long)]
        time_limit: String,
        /// Maximum number of players (2-100)
        #[arg(long)]
        max_players: String,
        /// Pot size in dollars
        #[arg(long)]
        pot_size: String,
        /// Entry fee in ETH
        #[arg(long)]
        entry_value: String,
        /// Start time, e.g. 2026-11-01T18:30 (UTC)
        #[arg(long)]
        start_time: String,
        /// A question as "phrase=answer"; repeat for more
        #[arg(short, long = "question")]
        questions: Vec<String>,
    },
}

pub async fn handle_admin_command(cmd: AdminCommands, ctx: &AppContext) -> Result<()> {
    match cmd {
        AdminCommands::Start { game_id, yes } => {
            if !yes {
                let confirm = Confirm::new()
                    .with_prompt(format!("Start game {} now?", game_id))
                    .default(false)
                    .interact()
                    .map_err(prompt_failed)?;
                if !confirm {
                    println!("Cancelled");
                    return Ok(());
                }
            }

            ctx.api.start_game(game_id).await?;
            println!("Game started successfully");
        }

        AdminCommands::Create {
            time_limit,
            max_players,
            pot_size,
            entry_value,
            start_time,
            questions,
        } => {
            let input = CreateGameInput {
                time_limit,
                max_players,
                pot_size,
                entry_value,
                start_time,
                questions: questions.iter().map(|q| split_question(q)).collect(),
            };
            let game = input
                .validate(Utc::now())
                .map_err(WinWalletError::Validation)?;

            ctx.api.create_game(&game).await?;
            println!(
                "Created game with {} questions, starting {}",
                game.questions.len(),
                super::local_time(Some(game.start_time))
            );
        }
    }

    Ok(())
}

/// `phrase=answer`; without an `=` the whole text is the phrase.
fn split_question(raw: &str) -> (String, String) {
    match raw.split_once('=') {
        Some((phrase, answer)) => (phrase.trim().to_string(), answer.trim().to_string()),
        None => (raw.trim().to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_question() {
        assert_eq!(
            split_question("Largest planet = Jupiter"),
            ("Largest planet".to_string(), "Jupiter".to_string())
        );
        assert_eq!(split_question("1+1=2=2").1, "2=2");
        assert_eq!(split_question("No answer").1, "");
    }
}
