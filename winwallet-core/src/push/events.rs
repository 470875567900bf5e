use crate::types::{GameId, GameSummary, PlayerInfo};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PushEvent {
    PlayerJoined(PlayerJoined),
    GameStarted {
        game_id: GameId,
    },
    NewGame(GameSummary),
    PlayerScoreUpdate {
        game_id: GameId,
        player_id: u64,
        score: u32,
    },
    GameComplete {
        game_id: GameId,
        winner_id: u64,
    },
}

impl PushEvent {
    /// Game the event is about; `new_game` announces its own id.
    pub fn game_id(&self) -> GameId {
        match self {
            Self::PlayerJoined(joined) => joined.game_id,
            Self::GameStarted { game_id }
            | Self::PlayerScoreUpdate { game_id, .. }
            | Self::GameComplete { game_id, .. } => *game_id,
            Self::NewGame(summary) => summary.id,
        }
    }
}

/// Some servers send the joining player, others only the new head count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerJoined {
    pub game_id: GameId,
    #[serde(default)]
    pub player: Option<PlayerInfo>,
    #[serde(default)]
    pub player_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { game_id: GameId },
}
