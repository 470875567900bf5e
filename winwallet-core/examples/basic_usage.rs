use winwallet_core::lifecycle::format_timer;
use winwallet_core::{ApiClient, ClientConfig, Clock, GameApi, GameLifecycle};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ClientConfig::from_env();
    println!("Using game server at {}", config.api_url);

    let client = ApiClient::new(&config)?;
    let games = client.list_games().await?;
    println!("Open games: {}", games.len());

    let Some(first) = games.first() else {
        return Ok(());
    };

    let game = client.game_detail(first.id).await?;
    println!("\nGame {}:", game.id);
    println!("Pot: ${:.2}", game.pot_size);
    println!("Players: {} / {}", game.players.len(), game.max_players);
    println!("Questions: {}", game.questions.len());

    // Where would a player joining now be?
    let clock = Clock::system();
    let mut lifecycle = GameLifecycle::new(game.id);
    if let Some(schedule) = game.schedule() {
        lifecycle.schedule_countdown(schedule, clock.now())?;
    }
    let tick = lifecycle.tick(clock.now());
    match tick.time_remaining {
        Some(remaining) => println!("{:?}, {} remaining", tick.phase, format_timer(remaining)),
        None => println!("{:?}, no start time yet", tick.phase),
    }

    Ok(())
}
