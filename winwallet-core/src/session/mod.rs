//! Drives one player's game from countdown to submitted answers.
//!
//! A [`GameSession`] runs as a single task: one `select!` loop owns the
//! lifecycle, the answer sheet and the push subscription, so nothing is
//! shared and nothing needs a lock. The UI talks to it through a
//! [`SessionHandle`].

mod handle;

pub use handle::{SessionCommands, SessionHandle};

use crate::api::GameApi;
use crate::forms::MAX_QUESTIONS;
use crate::lifecycle::{Clock, GameLifecycle, Phase, Tick, Transition, TransitionCause};
use crate::push::{PushEvent, Subscription};
use crate::sync::GameUpdate;
use crate::types::{AnswerSheet, AnswerSubmission, GameId, Question, SubmitResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Answer { index: usize, answer: String },
    Submit,
    Refresh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Countdown(Tick),
    PhaseChanged(Transition),
    Questions(Vec<Question>),
    Submitted(SubmitResponse),
    Alert { title: String, message: String },
    ScoreUpdate { player_id: u64, score: u32 },
    GameComplete { winner_id: u64 },
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub game_id: GameId,
    pub final_phase: Phase,
    pub transitions: Vec<Transition>,
    pub outcome: Option<SubmitResponse>,
    pub submit_error: Option<String>,
}

pub struct GameSession {
    api: Arc<dyn GameApi>,
    lifecycle: GameLifecycle,
    player_address: String,
    answers: AnswerSheet,
    clock: Clock,
    tick_interval: Duration,
    commands: mpsc::Receiver<SessionCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
    transitions: Vec<Transition>,
    outcome: Option<SubmitResponse>,
    submit_error: Option<String>,
    questions_sent: bool,
    question_count: Option<usize>,
}

impl GameSession {
    pub fn new(
        api: Arc<dyn GameApi>,
        game_id: GameId,
        player_address: impl Into<String>,
        clock: Clock,
        tick_interval: Duration,
    ) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let session = Self {
            api,
            lifecycle: GameLifecycle::new(game_id),
            player_address: player_address.into(),
            answers: AnswerSheet::new(),
            clock,
            tick_interval,
            commands: command_rx,
            events: event_tx,
            transitions: Vec::new(),
            outcome: None,
            submit_error: None,
            questions_sent: false,
            question_count: None,
        };

        (session, SessionHandle::new(command_tx, event_rx))
    }

    pub fn game_id(&self) -> GameId {
        self.lifecycle.game_id()
    }

    /// Applies a `game_started` that was seen before the session existed,
    /// e.g. by the lobby screen. No-op unless still Waiting.
    pub fn mark_started(&mut self) {
        let game_id = self.game_id();
        if let Some(transition) = self.lifecycle.on_external_start(game_id, self.clock.now()) {
            self.record(transition);
        }
    }

    /// Runs until the answers have been sent (or failed to send), or until
    /// every [`SessionCommands`] has been dropped.
    pub async fn run(mut self, mut push: Option<Subscription>) -> SessionReport {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.refresh().await;

        while self.lifecycle.phase() != Phase::Submitted {
            let start_at = self
                .lifecycle
                .pending_start()
                .map(|at| self.clock.instant_at(at));

            tokio::select! {
                _ = tokio::time::sleep_until(start_at.unwrap_or_else(Instant::now)), if start_at.is_some() => {
                    if let Some(transition) = self.lifecycle.fire_start_timer(self.clock.now()) {
                        self.record(transition);
                    }
                }
                _ = ticker.tick() => {
                    let tick = self.lifecycle.tick(self.clock.now());
                    self.emit(SessionEvent::Countdown(tick));
                    if tick.expired() {
                        self.submit(TransitionCause::TimeExpired).await;
                    }
                }
                event = next_push(&mut push), if push.is_some() => match event {
                    Some(event) => {
                        if let Some(update) = GameUpdate::from_push(event) {
                            self.reconcile(update);
                        }
                    }
                    None => {
                        tracing::warn!(
                            "Push channel ended for game {}, relying on local timers",
                            self.game_id()
                        );
                        push = None;
                    }
                },
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Answer { index, answer }) => self.answer(index, answer),
                    Some(SessionCommand::Submit) => self.submit(TransitionCause::UserSubmit).await,
                    Some(SessionCommand::Refresh) => self.refresh().await,
                    None => {
                        tracing::info!("Session for game {} detached", self.game_id());
                        break;
                    }
                },
            }
        }

        SessionReport {
            game_id: self.game_id(),
            final_phase: self.lifecycle.phase(),
            transitions: self.transitions,
            outcome: self.outcome,
            submit_error: self.submit_error,
        }
    }

    /// Applies one server fact, whether it was polled or pushed.
    fn reconcile(&mut self, update: GameUpdate) {
        if update.game_id() != self.game_id() {
            tracing::debug!("Ignoring update for game {}", update.game_id());
            return;
        }

        let now = self.clock.now();
        match update {
            GameUpdate::Snapshot(detail) => {
                if !detail.questions.is_empty() {
                    self.question_count = Some(detail.questions.len());
                }
                if !self.questions_sent && !detail.questions.is_empty() {
                    self.questions_sent = true;
                    self.emit(SessionEvent::Questions(detail.questions.clone()));
                }
                let Some(schedule) = detail.schedule() else {
                    tracing::debug!("Game {} has no schedule yet", detail.id);
                    return;
                };
                match self.lifecycle.schedule_countdown(schedule, now) {
                    Ok(Some(transition)) => self.record(transition),
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Rejected schedule: {}", e),
                }
            }
            GameUpdate::Started { game_id } => {
                if let Some(transition) = self.lifecycle.on_external_start(game_id, now) {
                    self.record(transition);
                }
            }
            GameUpdate::ScoreUpdate {
                player_id, score, ..
            } => self.emit(SessionEvent::ScoreUpdate { player_id, score }),
            GameUpdate::Completed { winner_id, .. } => {
                self.emit(SessionEvent::GameComplete { winner_id })
            }
            GameUpdate::PlayerJoined { .. } => {}
        }
    }

    /// Answers outside the question list are refused; until the questions
    /// are known the form's question limit applies.
    fn answer(&mut self, index: usize, answer: String) {
        let limit = self.question_count.unwrap_or(MAX_QUESTIONS);
        if index >= limit {
            tracing::warn!(
                "Ignoring answer {} for game {} ({} questions)",
                index,
                self.game_id(),
                limit
            );
            self.alert(
                "Invalid answer",
                format!("There is no question {} in this game.", index.saturating_add(1)),
            );
            return;
        }
        self.answers.set(index, answer);
    }

    async fn refresh(&mut self) {
        match self.api.game_detail(self.game_id()).await {
            Ok(detail) => self.reconcile(GameUpdate::Snapshot(detail)),
            Err(e) => {
                tracing::error!("Error fetching game details: {}", e);
                self.alert(
                    "Error",
                    "Unable to fetch game details. Please try again later.",
                );
            }
        }
    }

    /// Sends the answer sheet. The game is Submitted before the request goes
    /// out and stays Submitted whatever the server says; there is no retry.
    async fn submit(&mut self, cause: TransitionCause) {
        match self.lifecycle.begin_submit(cause, self.clock.now()) {
            Ok(transition) => self.record(transition),
            Err(e) => {
                tracing::warn!("Submit refused: {}", e);
                self.alert("Cannot submit", e.to_string());
                return;
            }
        }

        let submission = AnswerSubmission::new(self.player_address.clone(), &self.answers);
        match self.api.submit_answers(self.game_id(), &submission).await {
            Ok(response) => {
                tracing::info!(
                    "Game {} submission accepted: {}",
                    self.game_id(),
                    response.message
                );
                self.emit(SessionEvent::Submitted(response.clone()));
                self.outcome = Some(response);
            }
            Err(e) => {
                tracing::error!("Error submitting answers for game {}: {}", self.game_id(), e);
                self.submit_error = Some(e.to_string());
                self.alert("Submission failed", e.to_string());
            }
        }
    }

    fn record(&mut self, transition: Transition) {
        self.transitions.push(transition);
        self.emit(SessionEvent::PhaseChanged(transition));
    }

    fn alert(&self, title: &str, message: impl Into<String>) {
        self.emit(SessionEvent::Alert {
            title: title.to_string(),
            message: message.into(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        // the UI may already be gone
        let _ = self.events.send(event);
    }
}

async fn next_push(push: &mut Option<Subscription>) -> Option<PushEvent> {
    match push {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}
