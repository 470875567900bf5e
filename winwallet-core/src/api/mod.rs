//! HTTP access to the game server.

mod admin;

use crate::config::ClientConfig;
use crate::error::{Result, WinWalletError};
use crate::forms::JoinGameInput;
use crate::types::{
    AnswerSubmission, ErrorBody, GameDetail, GameId, GameSummary, StartGameResponse,
    SubmitResponse,
};
use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;

/// Server operations the lifecycle and screens depend on.
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn list_games(&self) -> Result<Vec<GameSummary>>;

    async fn game_detail(&self, game_id: GameId) -> Result<GameDetail>;

    async fn submit_answers(
        &self,
        game_id: GameId,
        submission: &AnswerSubmission,
    ) -> Result<SubmitResponse>;

    async fn start_game(&self, game_id: GameId) -> Result<StartGameResponse>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| WinWalletError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| WinWalletError::config(format!("Invalid request path '{}': {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path)?)
            .send()
            .await
            .map_err(WinWalletError::from_request)?;

        read_json(check_status(response).await?).await
    }

    /// Registers a player for a game. The server answers with its lobby page,
    /// so any successful status is taken as joined.
    pub async fn join_game(&self, game_id: GameId, input: &JoinGameInput) -> Result<()> {
        let address = input.validate().map_err(WinWalletError::Validation)?;

        let response = self
            .http
            .post(self.url(&format!("game/{}/join", game_id))?)
            .form(&[("ethereum_address", address.as_str())])
            .send()
            .await
            .map_err(WinWalletError::from_request)?;

        check_status(response).await?;
        tracing::info!("Joined game {} as {}", game_id, address);
        Ok(())
    }
}

#[async_trait]
impl GameApi for ApiClient {
    async fn list_games(&self) -> Result<Vec<GameSummary>> {
        let games: Vec<GameSummary> = self.get_json("api/games").await?;
        tracing::debug!("Fetched {} games", games.len());
        Ok(games)
    }

    async fn game_detail(&self, game_id: GameId) -> Result<GameDetail> {
        match self.get_json(&format!("api/games/{}", game_id)).await {
            Err(WinWalletError::Server { status: 404, .. }) => {
                Err(WinWalletError::GameNotFound { game_id })
            }
            other => other,
        }
    }

    async fn submit_answers(
        &self,
        game_id: GameId,
        submission: &AnswerSubmission,
    ) -> Result<SubmitResponse> {
        tracing::info!(
            "Submitting {} answers for game {}",
            submission.answers.len(),
            game_id
        );

        let response = self
            .http
            .post(self.url(&format!("game/{}/submit", game_id))?)
            .form(&submission.form_fields())
            .send()
            .await
            .map_err(WinWalletError::from_request)?;

        read_json(check_status(response).await?).await
    }

    async fn start_game(&self, game_id: GameId) -> Result<StartGameResponse> {
        self.post_start_game(game_id).await
    }
}

/// Turns a non-2xx response into `Server`, using the body's `error` or
/// `message` when it has one.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| default_message(status));

    tracing::warn!("Server responded {}: {}", status, message);
    Err(WinWalletError::Server {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(WinWalletError::from_request)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unexpected response")
        .to_string()
}
