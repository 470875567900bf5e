use super::{check_status, ApiClient};
use crate::error::{Result, WinWalletError};
use crate::forms::NewGame;
use crate::types::{GameId, StartGameResponse};

const START_FAILED: &str = "Failed to start game.";

impl ApiClient {
    /// `POST /admin/start_game/{id}`. A `success: false` body becomes
    /// `Rejected` carrying the server's message.
    pub(super) async fn post_start_game(&self, game_id: GameId) -> Result<StartGameResponse> {
        let response = self
            .http
            .post(self.url(&format!("admin/start_game/{}", game_id))?)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(WinWalletError::from_request)?;

        let status = response.status();
        let body = response.text().await.map_err(WinWalletError::from_request)?;

        // a rejection may come back with any status, so look at the body first
        match serde_json::from_str::<StartGameResponse>(&body) {
            Ok(parsed) if parsed.success && status.is_success() => {
                tracing::info!("Started game {}", game_id);
                Ok(parsed)
            }
            Ok(parsed) => {
                let message = parsed
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| START_FAILED.to_string());
                tracing::warn!("Server refused to start game {}: {}", game_id, message);
                Err(WinWalletError::rejected(message))
            }
            Err(_) if !status.is_success() => Err(WinWalletError::Server {
                status: status.as_u16(),
                message: START_FAILED.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Posts a validated create-game form.
    pub async fn create_game(&self, game: &NewGame) -> Result<()> {
        let fields = game.form_fields();
        let response = self
            .http
            .post(self.url("admin/create_game")?)
            .form(&fields)
            .send()
            .await
            .map_err(WinWalletError::from_request)?;

        check_status(response).await?;
        tracing::info!(
            "Created game starting {} with {} questions",
            game.start_time,
            game.questions.len()
        );
        Ok(())
    }
}
