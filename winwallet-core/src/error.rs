use crate::forms::FieldError;
use crate::lifecycle::Phase;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WinWalletError>;

#[derive(Error, Debug)]
pub enum WinWalletError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Game not found: {game_id}")]
    GameNotFound { game_id: u64 },

    #[error("Push channel error: {0}")]
    PushChannel(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Validation failed: {}", join_messages(.0))]
    Validation(Vec<FieldError>),

    #[error("Game {game_id} is not active (currently {phase:?})")]
    NotActive { game_id: u64, phase: Phase },

    #[error("Answers for game {game_id} were already submitted")]
    AlreadySubmitted { game_id: u64 },

    #[error("Schedule for game {got} does not belong to game {expected}")]
    GameMismatch { expected: u64, got: u64 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WinWalletError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn push(msg: impl Into<String>) -> Self {
        Self::PushChannel(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Timeouts get their own variant so callers can tell a slow server
    /// from an unreachable one.
    pub(crate) fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Http(err)
        }
    }

    /// True for failures of the transport itself, as opposed to an answer
    /// the server gave.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout(_) | Self::WebSocket(_) | Self::PushChannel(_)
        )
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
