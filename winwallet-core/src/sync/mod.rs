//! One shape for everything the server tells us about a game.
//!
//! Polled snapshots and push events are both turned into [`GameUpdate`]s so
//! that the session and the screens apply them through a single
//! `reconcile` path instead of one per source.

use crate::push::PushEvent;
use crate::types::{GameDetail, GameId, GameSummary, PlayerInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum GameUpdate {
    /// Full server view from `GET /api/games/{id}`.
    Snapshot(GameDetail),
    PlayerJoined {
        game_id: GameId,
        player: Option<PlayerInfo>,
        player_count: Option<u32>,
    },
    Started {
        game_id: GameId,
    },
    ScoreUpdate {
        game_id: GameId,
        player_id: u64,
        score: u32,
    },
    Completed {
        game_id: GameId,
        winner_id: u64,
    },
}

impl GameUpdate {
    pub fn game_id(&self) -> GameId {
        match self {
            Self::Snapshot(detail) => detail.id,
            Self::PlayerJoined { game_id, .. }
            | Self::Started { game_id }
            | Self::ScoreUpdate { game_id, .. }
            | Self::Completed { game_id, .. } => *game_id,
        }
    }

    /// The per-game update carried by a push event. `new_game` belongs to
    /// the game board, not to any single game.
    pub fn from_push(event: PushEvent) -> Option<Self> {
        match event {
            PushEvent::PlayerJoined(joined) => Some(Self::PlayerJoined {
                game_id: joined.game_id,
                player: joined.player,
                player_count: joined.player_count,
            }),
            PushEvent::GameStarted { game_id } => Some(Self::Started { game_id }),
            PushEvent::PlayerScoreUpdate {
                game_id,
                player_id,
                score,
            } => Some(Self::ScoreUpdate {
                game_id,
                player_id,
                score,
            }),
            PushEvent::GameComplete { game_id, winner_id } => {
                Some(Self::Completed { game_id, winner_id })
            }
            PushEvent::NewGame(_) => None,
        }
    }
}

impl From<GameDetail> for GameUpdate {
    fn from(detail: GameDetail) -> Self {
        Self::Snapshot(detail)
    }
}

/// Updates for the open-games list.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardUpdate {
    Snapshot(Vec<GameSummary>),
    NewGame(GameSummary),
}

impl BoardUpdate {
    pub fn from_push(event: PushEvent) -> Option<Self> {
        match event {
            PushEvent::NewGame(summary) => Some(Self::NewGame(summary)),
            _ => None,
        }
    }
}
