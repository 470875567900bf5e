use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type GameId = u64;

/// Parses the timestamp shapes the server and the admin form produce:
/// RFC 3339, or a naive date-time taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn de_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: u64,
    pub ethereum_address: String,
    #[serde(default)]
    pub score: Option<u32>,
}

/// Entry of the open-games list (`GET /api/games`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: GameId,
    pub pot_size: f64,
    pub max_players: u32,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub players: Vec<PlayerInfo>,
    #[serde(default)]
    pub player_count: Option<u32>,
}

impl GameSummary {
    /// Servers send either the player list or just a count.
    pub fn player_count(&self) -> u32 {
        self.player_count.unwrap_or(self.players.len() as u32)
    }

    pub fn is_full(&self) -> bool {
        self.player_count() >= self.max_players
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub phrase: String,
}

/// Single game as returned by `GET /api/games/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetail {
    pub id: GameId,
    #[serde(default)]
    pub pot_size: f64,
    #[serde(default)]
    pub max_players: u32,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    /// Seconds players get to answer once the game starts.
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub entry_value: Option<f64>,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub players: Vec<PlayerInfo>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl GameDetail {
    /// A detail only yields a schedule once the server has a start time and
    /// a time limit for it.
    pub fn schedule(&self) -> Option<GameSchedule> {
        Some(GameSchedule {
            game_id: self.id,
            start_time: self.start_time?,
            duration_seconds: self.time_limit?,
        })
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            id: self.id,
            pot_size: self.pot_size,
            max_players: self.max_players,
            start_time: self.start_time,
            players: self.players.clone(),
            player_count: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSchedule {
    pub game_id: GameId,
    pub start_time: DateTime<Utc>,
    pub duration_seconds: u32,
}

impl GameSchedule {
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.duration_seconds))
    }
}

/// Answers collected so far, indexed by question position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: Vec<String>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, index: usize, answer: impl Into<String>) {
        if self.answers.len() <= index {
            self.answers.resize(index + 1, String::new());
        }
        self.answers[index] = answer.into();
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn answered(&self) -> usize {
        self.answers.iter().filter(|a| !a.trim().is_empty()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSubmission {
    pub ethereum_address: String,
    pub answers: Vec<String>,
}

impl AnswerSubmission {
    pub fn new(ethereum_address: impl Into<String>, sheet: &AnswerSheet) -> Self {
        Self {
            ethereum_address: ethereum_address.into(),
            answers: sheet.answers().to_vec(),
        }
    }

    /// Form body: the address once, then one `answers[]` pair per answer.
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = Vec::with_capacity(self.answers.len() + 1);
        fields.push(("ethereum_address", self.ethereum_address.as_str()));
        fields.extend(self.answers.iter().map(|a| ("answers[]", a.as_str())));
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub game_complete: Option<bool>,
}

impl SubmitResponse {
    pub fn won(&self) -> bool {
        self.game_complete.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartGameResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body the server sends alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}
