//! Screen models: the open-games board and the pre-start lobby.

pub mod home;
pub mod lobby;

pub use home::{watch_games, GameBoard};
pub use lobby::{run_lobby, LobbyChange, LobbyEvent, LobbyExit, LobbyOptions, LobbyView};
