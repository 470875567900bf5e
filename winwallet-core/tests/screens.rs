use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use winwallet_core::screen::{
    run_lobby, watch_games, GameBoard, LobbyChange, LobbyEvent, LobbyExit, LobbyOptions,
};
use winwallet_core::types::{AnswerSubmission, StartGameResponse};
use winwallet_core::{
    Clock, GameApi, GameDetail, GameId, GameSession, GameSummary, Phase, PushChannel, Result,
    SubmitResponse, TransitionCause, WinWalletError,
};

const GAME: GameId = 7;

struct StubApi {
    detail: GameDetail,
    games: Vec<GameSummary>,
    detail_calls: AtomicUsize,
}

impl StubApi {
    fn new(start_in: i64) -> Self {
        Self {
            detail: GameDetail {
                id: GAME,
                pot_size: 50.0,
                max_players: 4,
                start_time: Some(Utc::now() + ChronoDuration::seconds(start_in)),
                time_limit: Some(60),
                entry_value: None,
                is_complete: false,
                players: Vec::new(),
                questions: Vec::new(),
            },
            games: Vec::new(),
            detail_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GameApi for StubApi {
    async fn list_games(&self) -> Result<Vec<GameSummary>> {
        Ok(self.games.clone())
    }

    async fn game_detail(&self, game_id: GameId) -> Result<GameDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.detail.id == game_id {
            Ok(self.detail.clone())
        } else {
            Err(WinWalletError::GameNotFound { game_id })
        }
    }

    async fn submit_answers(
        &self,
        _game_id: GameId,
        _submission: &AnswerSubmission,
    ) -> Result<SubmitResponse> {
        Err(WinWalletError::internal("not used"))
    }

    async fn start_game(&self, _game_id: GameId) -> Result<StartGameResponse> {
        Err(WinWalletError::internal("not used"))
    }
}

fn summary(id: GameId, start_in: i64) -> GameSummary {
    GameSummary {
        id,
        pot_size: 10.0,
        max_players: 4,
        start_time: Some(Utc::now() + ChronoDuration::seconds(start_in)),
        players: Vec::new(),
        player_count: Some(0),
    }
}

async fn listen() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    accept_async(stream).await.unwrap()
}

async fn send(ws: &mut WebSocketStream<TcpStream>, frame: &str) {
    ws.send(Message::Text(frame.to_string())).await.unwrap();
}

fn options(refresh_ms: u64) -> LobbyOptions {
    LobbyOptions {
        tick_interval: Duration::from_millis(20),
        refresh_interval: Duration::from_millis(refresh_ms),
    }
}

#[tokio::test]
async fn test_lobby_exits_on_game_started() {
    let (listener, addr) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        // wait for the room join so the lobby is subscribed
        ws.next().await;
        send(&mut ws, r#"{"event": "player_joined", "data": {"game_id": 7, "player_count": 2}}"#).await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        send(&mut ws, r#"{"event": "game_started", "data": {"game_id": 7}}"#).await;
        // hold the connection open until the client leaves
        while let Some(Ok(_)) = ws.next().await {}
    });

    let api = StubApi::new(3600);
    let channel = PushChannel::connect(&format!("ws://{}", addr)).await.unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let exit = timeout(
        Duration::from_secs(5),
        run_lobby(&api, &channel, GAME, Clock::system(), options(50), tx),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(exit, LobbyExit::Started);

    // re-polled while waiting
    assert!(api.detail_calls.load(Ordering::SeqCst) >= 2);

    let mut changes = Vec::new();
    let mut pushed_count = None;
    while let Ok((view, event)) = rx.try_recv() {
        if let LobbyEvent::Updated(change) = event {
            if change == LobbyChange::Players {
                pushed_count = Some(view.player_count());
            }
            changes.push(change);
        }
    }
    assert_eq!(pushed_count, Some(2));
    assert_eq!(changes.last(), Some(&LobbyChange::Started));

    channel.disconnect().await;
    server.await.unwrap();
}

#[tokio::test]
async fn test_lobby_falls_back_to_start_time() {
    let (listener, addr) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        while let Some(Ok(_)) = ws.next().await {}
    });

    // scheduled start already behind us and no push will announce it
    let api = StubApi::new(-1);
    let channel = PushChannel::connect(&format!("ws://{}", addr)).await.unwrap();
    let (tx, _rx) = mpsc::unbounded_channel();

    let exit = timeout(
        Duration::from_secs(5),
        run_lobby(&api, &channel, GAME, Clock::system(), options(1000), tx),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(exit, LobbyExit::StartTimeReached);

    channel.disconnect().await;
    server.await.unwrap();
}

#[tokio::test]
async fn test_lobby_exits_when_channel_closes() {
    let (listener, addr) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.next().await;
        ws.close(None).await.unwrap();
    });

    let api = StubApi::new(3600);
    let channel = PushChannel::connect(&format!("ws://{}", addr)).await.unwrap();
    let (tx, _rx) = mpsc::unbounded_channel();

    let exit = timeout(
        Duration::from_secs(5),
        run_lobby(&api, &channel, GAME, Clock::system(), options(1000), tx),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(exit, LobbyExit::Closed);
    server.await.unwrap();
}

#[tokio::test]
async fn test_board_follows_new_game_pushes() {
    let (listener, addr) = listen().await;
    let (go_tx, go_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        go_rx.await.unwrap();
        send(&mut ws, r#"{"event": "game_started", "data": {"game_id": 1}}"#).await;
        send(
            &mut ws,
            r#"{"event": "new_game", "data": {"id": 9, "pot_size": 75.0, "max_players": 8, "players": []}}"#,
        )
        .await;
        ws.close(None).await.unwrap();
    });

    let mut api = StubApi::new(3600);
    api.games = vec![summary(1, 600), summary(2, 60)];
    let channel = PushChannel::connect(&format!("ws://{}", addr)).await.unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let observer = async move {
        let first: GameBoard = rx.recv().await.unwrap();
        let ids: Vec<GameId> = first.games().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 1]);

        go_tx.send(()).unwrap();
        let second = rx.recv().await.unwrap();
        let ids: Vec<GameId> = second.games().iter().map(|g| g.id).collect();
        // unscheduled games sort last
        assert_eq!(ids, vec![2, 1, 9]);
        assert!(rx.recv().await.is_none());
    };

    let (board, ()) = timeout(
        Duration::from_secs(5),
        async { tokio::join!(watch_games(&api, &channel, tx), observer) },
    )
    .await
    .unwrap();
    assert_eq!(board.unwrap().games().len(), 3);
    server.await.unwrap();
}

#[tokio::test]
async fn test_lobby_start_carries_into_game_session() {
    let (listener, addr) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.next().await;
        send(&mut ws, r#"{"event": "game_started", "data": {"game_id": 7}}"#).await;
        while let Some(Ok(_)) = ws.next().await {}
    });

    // scheduled far in the future; only the push says it has begun
    let api = Arc::new(StubApi::new(600));
    let channel = PushChannel::connect(&format!("ws://{}", addr)).await.unwrap();
    let (tx, _rx) = mpsc::unbounded_channel();

    let exit = timeout(
        Duration::from_secs(5),
        run_lobby(api.as_ref(), &channel, GAME, Clock::system(), options(1000), tx),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(exit, LobbyExit::Started);

    let subscription = channel.subscribe();
    let (mut session, handle) = GameSession::new(
        api.clone(),
        GAME,
        "0x00000000000000000000000000000000000000aa",
        Clock::system(),
        Duration::from_millis(20),
    );
    session.mark_started();
    let commands = handle.commands();
    let task = tokio::spawn(session.run(Some(subscription)));

    commands.submit().await.unwrap();
    let report = timeout(Duration::from_secs(5), task).await.unwrap().unwrap();

    assert_eq!(report.transitions[0].to, Phase::Active);
    assert_eq!(report.transitions[0].cause, TransitionCause::ExternalStart);
    assert_eq!(report.final_phase, Phase::Submitted);
    drop(handle);

    channel.disconnect().await;
    server.await.unwrap();
}
