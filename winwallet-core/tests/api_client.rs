use serde_json::json;
use std::time::Duration;
use winwallet_core::forms::{CreateGameInput, JoinGameInput};
use winwallet_core::types::{AnswerSheet, AnswerSubmission};
use winwallet_core::{ApiClient, ClientConfig, GameApi, WinWalletError};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADDRESS: &str = "0x00000000000000000000000000000000000000aa";

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&ClientConfig::new(server.uri(), "ws://localhost:5000/game")).unwrap()
}

#[tokio::test]
async fn test_list_games() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/games"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "pot_size": 120.0,
                "max_players": 10,
                "start_time": "2026-09-01T18:00:00",
                "players": [{"id": 4, "ethereum_address": ADDRESS}]
            },
            {"id": 2, "pot_size": 5.0, "max_players": 2, "player_count": 1}
        ])))
        .mount(&server)
        .await;

    let games = client_for(&server).list_games().await.unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].player_count(), 1);
    assert!(games[0].start_time.is_some());
    assert_eq!(games[1].player_count(), 1);
}

#[tokio::test]
async fn test_game_detail_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/games/42"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).game_detail(42).await.unwrap_err();
    assert!(matches!(err, WinWalletError::GameNotFound { game_id: 42 }));
}

#[tokio::test]
async fn test_start_game_rejected_shows_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/start_game/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "already started"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).start_game(7).await.unwrap_err();
    assert!(matches!(err, WinWalletError::Rejected(_)));
    assert!(err.to_string().contains("already started"));
}

#[tokio::test]
async fn test_start_game_failure_without_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/start_game/8"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).start_game(8).await.unwrap_err();
    match err {
        WinWalletError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to start game.");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_start_game_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/start_game/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let response = client_for(&server).start_game(3).await.unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn test_submit_answers_posts_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/game/5/submit"))
        .and(body_string_contains("answers%5B%5D=Paris"))
        .and(body_string_contains("ethereum_address=0x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Congratulations! You won the game!",
            "score": 1,
            "game_complete": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut sheet = AnswerSheet::new();
    sheet.set(0, "Paris");
    let response = client_for(&server)
        .submit_answers(5, &AnswerSubmission::new(ADDRESS, &sheet))
        .await
        .unwrap();
    assert!(response.won());
    assert_eq!(response.score, Some(1));
}

#[tokio::test]
async fn test_submit_unknown_player() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/game/5/submit"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Player not found"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit_answers(5, &AnswerSubmission::new(ADDRESS, &AnswerSheet::new()))
        .await
        .unwrap_err();
    match err {
        WinWalletError::Server { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Player not found");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/games"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut config = ClientConfig::new(server.uri(), "ws://localhost:5000/game");
    config.request_timeout = Duration::from_millis(50);
    let err = ApiClient::new(&config).unwrap().list_games().await.unwrap_err();
    assert!(matches!(err, WinWalletError::Timeout(_)));
    assert!(err.is_network());
}

#[tokio::test]
async fn test_join_validates_before_posting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/game/9/join"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>lobby</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .join_game(9, &JoinGameInput::new("0x12"))
        .await
        .unwrap_err();
    assert!(matches!(err, WinWalletError::Validation(_)));

    client
        .join_game(9, &JoinGameInput::new(ADDRESS))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_game_posts_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/create_game"))
        .and(body_string_contains("time_limit=120"))
        .and(body_string_contains("phrase_0=Largest+planet"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let input = CreateGameInput {
        time_limit: "120".to_string(),
        max_players: "4".to_string(),
        pot_size: "10".to_string(),
        entry_value: "0.5".to_string(),
        start_time: "2099-01-01T10:00".to_string(),
        questions: vec![("Largest planet".to_string(), "Jupiter".to_string())],
    };
    let game = input.validate(chrono::Utc::now()).unwrap();
    client_for(&server).create_game(&game).await.unwrap();
}
