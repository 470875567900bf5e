use crate::api::GameApi;
use crate::error::Result;
use crate::lifecycle::{format_lobby_countdown, Clock};
use crate::push::PushChannel;
use crate::sync::GameUpdate;
use crate::types::{GameDetail, GameId, PlayerInfo};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// What changed after a lobby update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyChange {
    None,
    Players,
    Game,
    Started,
}

/// Pre-start waiting room for one game.
#[derive(Debug, Clone)]
pub struct LobbyView {
    game_id: GameId,
    game: Option<GameDetail>,
    players: Vec<PlayerInfo>,
    // head count from count-only join events
    reported_count: Option<u32>,
    started: bool,
}

impl LobbyView {
    pub fn new(game_id: GameId) -> Self {
        Self {
            game_id,
            game: None,
            players: Vec::new(),
            reported_count: None,
            started: false,
        }
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn game(&self) -> Option<&GameDetail> {
        self.game.as_ref()
    }

    pub fn players(&self) -> &[PlayerInfo] {
        &self.players
    }

    pub fn player_count(&self) -> u32 {
        let listed = self.players.len() as u32;
        self.reported_count.map_or(listed, |count| count.max(listed))
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn reconcile(&mut self, update: GameUpdate) -> LobbyChange {
        if update.game_id() != self.game_id {
            return LobbyChange::None;
        }

        match update {
            GameUpdate::Snapshot(detail) => {
                // the server's list is authoritative
                self.players = detail.players.clone();
                self.reported_count = None;
                self.game = Some(detail);
                LobbyChange::Game
            }
            GameUpdate::PlayerJoined {
                player,
                player_count,
                ..
            } => {
                let mut changed = false;
                if let Some(player) = player {
                    if !self.players.iter().any(|p| p.id == player.id) {
                        self.players.push(player);
                        changed = true;
                    }
                }
                if let Some(count) = player_count {
                    changed |= self.reported_count != Some(count);
                    self.reported_count = Some(count);
                }
                if changed {
                    LobbyChange::Players
                } else {
                    LobbyChange::None
                }
            }
            GameUpdate::Started { .. } => {
                self.started = true;
                LobbyChange::Started
            }
            GameUpdate::ScoreUpdate { .. } | GameUpdate::Completed { .. } => LobbyChange::None,
        }
    }

    /// The scheduled start has passed, whether or not anyone announced it.
    pub fn start_reached(&self, now: DateTime<Utc>) -> bool {
        self.game
            .as_ref()
            .and_then(|g| g.start_time)
            .is_some_and(|start| start <= now)
    }

    /// Countdown text; empty until the game has a start time.
    pub fn countdown(&self, now: DateTime<Utc>) -> String {
        match self.game.as_ref().and_then(|g| g.start_time) {
            Some(start) => {
                format_lobby_countdown((start - now).to_std().unwrap_or(Duration::ZERO))
            }
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LobbyEvent {
    Countdown(String),
    Updated(LobbyChange),
    Alert { title: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyExit {
    /// `game_started` arrived; time to move to the play screen.
    Started,
    /// No `game_started` came but the scheduled start has passed.
    StartTimeReached,
    /// The push channel ended or the listener went away.
    Closed,
}

#[derive(Debug, Clone, Copy)]
pub struct LobbyOptions {
    pub tick_interval: Duration,
    pub refresh_interval: Duration,
}

/// Runs the lobby screen: fetch, join the game's room, tick the countdown,
/// re-poll now and then, and follow pushes until the game starts or its
/// start time passes.
pub async fn run_lobby(
    api: &dyn GameApi,
    channel: &PushChannel,
    game_id: GameId,
    clock: Clock,
    options: LobbyOptions,
    events: mpsc::UnboundedSender<(LobbyView, LobbyEvent)>,
) -> Result<LobbyExit> {
    let mut view = LobbyView::new(game_id);
    let mut subscription = channel.subscribe();
    channel.join(game_id)?;

    let mut ticker = tokio::time::interval(options.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first refresh tick is immediate and doubles as the initial fetch
    let mut refresher = tokio::time::interval(options.refresh_interval);
    refresher.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let event = tokio::select! {
            _ = ticker.tick() => LobbyEvent::Countdown(view.countdown(clock.now())),
            _ = refresher.tick() => match api.game_detail(game_id).await {
                Ok(detail) => LobbyEvent::Updated(view.reconcile(GameUpdate::Snapshot(detail))),
                Err(e) => {
                    tracing::error!("Error fetching game details: {}", e);
                    LobbyEvent::Alert {
                        title: "Error".to_string(),
                        message: "Unable to fetch game details. Please try again later.".to_string(),
                    }
                }
            },
            pushed = subscription.recv() => match pushed {
                Some(pushed) => match GameUpdate::from_push(pushed) {
                    Some(update) => LobbyEvent::Updated(view.reconcile(update)),
                    None => continue,
                },
                None => {
                    tracing::warn!("Push channel closed while in lobby {}", game_id);
                    return Ok(LobbyExit::Closed);
                }
            },
        };

        if matches!(event, LobbyEvent::Updated(LobbyChange::None)) {
            continue;
        }
        if events.send((view.clone(), event)).is_err() {
            return Ok(LobbyExit::Closed);
        }
        if view.has_started() {
            tracing::info!("Game {} started, leaving lobby", game_id);
            return Ok(LobbyExit::Started);
        }
        if view.start_reached(clock.now()) {
            tracing::info!("Start time of game {} reached, leaving lobby", game_id);
            return Ok(LobbyExit::StartTimeReached);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn player(id: u64) -> PlayerInfo {
        PlayerInfo {
            id,
            ethereum_address: format!("0x{:040}", id),
            score: None,
        }
    }

    fn snapshot(players: Vec<PlayerInfo>) -> GameDetail {
        GameDetail {
            id: 5,
            pot_size: 40.0,
            max_players: 6,
            start_time: Some(Utc.with_ymd_and_hms(2026, 8, 1, 12, 2, 5).unwrap()),
            time_limit: Some(120),
            entry_value: None,
            is_complete: false,
            players,
            questions: Vec::new(),
        }
    }

    fn joined(player: Option<PlayerInfo>, count: Option<u32>) -> GameUpdate {
        GameUpdate::PlayerJoined {
            game_id: 5,
            player,
            player_count: count,
        }
    }

    #[test]
    fn test_joins_are_deduplicated() {
        let mut lobby = LobbyView::new(5);
        lobby.reconcile(GameUpdate::Snapshot(snapshot(vec![player(1)])));

        assert_eq!(lobby.reconcile(joined(Some(player(1)), None)), LobbyChange::None);
        assert_eq!(lobby.reconcile(joined(Some(player(2)), None)), LobbyChange::Players);
        assert_eq!(lobby.players().len(), 2);
    }

    #[test]
    fn test_count_only_join_and_snapshot_reset() {
        let mut lobby = LobbyView::new(5);
        lobby.reconcile(GameUpdate::Snapshot(snapshot(vec![player(1)])));
        assert_eq!(lobby.reconcile(joined(None, Some(3))), LobbyChange::Players);
        assert_eq!(lobby.player_count(), 3);

        lobby.reconcile(GameUpdate::Snapshot(snapshot(vec![player(1), player(2)])));
        assert_eq!(lobby.player_count(), 2);
    }

    #[test]
    fn test_other_games_are_ignored() {
        let mut lobby = LobbyView::new(5);
        assert_eq!(
            lobby.reconcile(GameUpdate::Started { game_id: 6 }),
            LobbyChange::None
        );
        assert!(!lobby.has_started());
        assert_eq!(
            lobby.reconcile(GameUpdate::Started { game_id: 5 }),
            LobbyChange::Started
        );
        assert!(lobby.has_started());
    }

    #[test]
    fn test_start_reached() {
        let mut lobby = LobbyView::new(5);
        let start = Utc.with_ymd_and_hms(2026, 8, 1, 12, 2, 5).unwrap();
        assert!(!lobby.start_reached(start));

        lobby.reconcile(GameUpdate::Snapshot(snapshot(Vec::new())));
        assert!(!lobby.start_reached(start - chrono::Duration::seconds(1)));
        assert!(lobby.start_reached(start));
    }

    #[test]
    fn test_countdown_text() {
        let mut lobby = LobbyView::new(5);
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        assert_eq!(lobby.countdown(now), "");

        lobby.reconcile(GameUpdate::Snapshot(snapshot(Vec::new())));
        assert_eq!(lobby.countdown(now), "2:05");
        assert_eq!(
            lobby.countdown(now + chrono::Duration::minutes(5)),
            "Game starting..."
        );
    }
}
