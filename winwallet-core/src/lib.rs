//! Win the Wallet client SDK - core library
//!
//! Talks to the game server over HTTP and a push channel, and keeps each
//! player's local view of a game (countdown, answering, submission) in step
//! with what the server reports.

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod lifecycle;
pub mod push;
pub mod screen;
pub mod session;
pub mod sync;
pub mod types;

pub use api::{ApiClient, GameApi};
pub use config::ClientConfig;
pub use error::{Result, WinWalletError};
pub use lifecycle::{Clock, GameLifecycle, Phase, Transition, TransitionCause};
pub use push::{PushChannel, PushEvent, Subscription};
pub use session::{GameSession, SessionEvent, SessionHandle, SessionReport};
pub use types::{GameDetail, GameId, GameSchedule, GameSummary, PlayerInfo, SubmitResponse};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_default_config() {
        let config = ClientConfig::default();
        let client = ApiClient::new(&config).unwrap();
        assert!(client.base_url().as_str().ends_with('/'));
    }
}
