use crate::api::GameApi;
use crate::error::Result;
use crate::push::PushChannel;
use crate::sync::BoardUpdate;
use crate::types::GameSummary;
use tokio::sync::mpsc;

/// The open-games list, ordered by start time (unscheduled games last).
#[derive(Debug, Clone, Default)]
pub struct GameBoard {
    games: Vec<GameSummary>,
}

impl GameBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn games(&self) -> &[GameSummary] {
        &self.games
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn reconcile(&mut self, update: BoardUpdate) {
        match update {
            BoardUpdate::Snapshot(games) => self.games = games,
            BoardUpdate::NewGame(game) => {
                match self.games.iter_mut().find(|g| g.id == game.id) {
                    Some(existing) => *existing = game,
                    None => self.games.push(game),
                }
            }
        }
        self.games
            .sort_by_key(|g| (g.start_time.is_none(), g.start_time, g.id));
    }
}

/// Keeps a board current: one fetch, then `new_game` pushes. Each change is
/// sent to `updates`; returns when the channel closes or the receiver is
/// dropped.
pub async fn watch_games(
    api: &dyn GameApi,
    channel: &PushChannel,
    updates: mpsc::UnboundedSender<GameBoard>,
) -> Result<GameBoard> {
    let mut subscription = channel.subscribe();
    let mut board = GameBoard::new();

    board.reconcile(BoardUpdate::Snapshot(api.list_games().await?));
    if updates.send(board.clone()).is_err() {
        return Ok(board);
    }

    while let Some(event) = subscription.recv().await {
        let Some(update) = BoardUpdate::from_push(event) else {
            continue;
        };
        board.reconcile(update);
        if updates.send(board.clone()).is_err() {
            break;
        }
    }

    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn game(id: u64, hour: Option<u32>) -> GameSummary {
        GameSummary {
            id,
            pot_size: 10.0,
            max_players: 4,
            start_time: hour.map(|h| Utc.with_ymd_and_hms(2026, 7, 1, h, 0, 0).unwrap()),
            players: Vec::new(),
            player_count: None,
        }
    }

    #[test]
    fn test_snapshot_is_sorted_by_start() {
        let mut board = GameBoard::new();
        board.reconcile(BoardUpdate::Snapshot(vec![
            game(1, None),
            game(2, Some(18)),
            game(3, Some(9)),
        ]));
        let ids: Vec<u64> = board.games().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_new_game_inserts_or_replaces() {
        let mut board = GameBoard::new();
        board.reconcile(BoardUpdate::Snapshot(vec![game(1, Some(10))]));

        board.reconcile(BoardUpdate::NewGame(game(2, Some(8))));
        assert_eq!(board.games().len(), 2);
        assert_eq!(board.games()[0].id, 2);

        let mut bigger = game(1, Some(10));
        bigger.pot_size = 99.0;
        board.reconcile(BoardUpdate::NewGame(bigger));
        assert_eq!(board.games().len(), 2);
        assert_eq!(board.games()[1].pot_size, 99.0);
    }
}
