//! Local game lifecycle: Waiting -> Active -> Submitted.
//!
//! [`GameLifecycle`] is a plain state machine with time passed in, so it can
//! be driven by the session loop and tested without a runtime.

pub mod clock;
pub mod countdown;

pub use clock::Clock;
pub use countdown::{format_lobby_countdown, format_timer};

use crate::error::{Result, WinWalletError};
use crate::types::{GameId, GameSchedule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Waiting,
    Active,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionCause {
    /// The local start timer reached the scheduled start.
    StartTimer,
    /// The push channel announced the game started.
    ExternalStart,
    /// The schedule arrived with its start already in the past.
    AlreadyStarted,
    UserSubmit,
    /// The answering time ran out.
    TimeExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub at: DateTime<Utc>,
    pub cause: TransitionCause,
}

/// What a tick shows: the phase and how long is left in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub phase: Phase,
    /// Time until start while Waiting, time left to answer while Active.
    /// `None` until the schedule is known.
    pub time_remaining: Option<Duration>,
}

impl Tick {
    /// The answering time has run out and the answers must be sent.
    pub fn expired(&self) -> bool {
        self.phase == Phase::Active && self.time_remaining == Some(Duration::ZERO)
    }
}

#[derive(Debug, Clone)]
pub struct GameLifecycle {
    game_id: GameId,
    phase: Phase,
    schedule: Option<GameSchedule>,
    pending_start: Option<DateTime<Utc>>,
    activated_at: Option<DateTime<Utc>>,
}

impl GameLifecycle {
    pub fn new(game_id: GameId) -> Self {
        Self {
            game_id,
            phase: Phase::Waiting,
            schedule: None,
            pending_start: None,
            activated_at: None,
        }
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn schedule(&self) -> Option<&GameSchedule> {
        self.schedule.as_ref()
    }

    /// Start time the one-shot timer is armed for, if any.
    pub fn pending_start(&self) -> Option<DateTime<Utc>> {
        self.pending_start
    }

    /// When answering ends, once both the activation time and the duration
    /// are known.
    pub fn answer_deadline(&self) -> Option<DateTime<Utc>> {
        Some(self.activated_at? + self.schedule?.duration())
    }

    /// Adopts a schedule. Only the first schedule for this game counts; later
    /// ones are ignored so the start timer is never armed twice.
    pub fn schedule_countdown(
        &mut self,
        schedule: GameSchedule,
        now: DateTime<Utc>,
    ) -> Result<Option<Transition>> {
        if schedule.game_id != self.game_id {
            return Err(WinWalletError::GameMismatch {
                expected: self.game_id,
                got: schedule.game_id,
            });
        }

        if self.schedule.is_some() {
            tracing::debug!("Game {} already scheduled, ignoring", self.game_id);
            return Ok(None);
        }
        self.schedule = Some(schedule);

        if self.phase != Phase::Waiting {
            // started by a push before we knew the schedule
            return Ok(None);
        }

        if now >= schedule.start_time {
            return Ok(Some(self.activate(now, TransitionCause::AlreadyStarted)));
        }

        self.pending_start = Some(schedule.start_time);
        tracing::info!(
            "Game {} starts at {}, countdown armed",
            self.game_id,
            schedule.start_time
        );
        Ok(None)
    }

    /// Called when the start timer fires. Early wake-ups do nothing.
    pub fn fire_start_timer(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        match self.pending_start {
            Some(start) if self.phase == Phase::Waiting && now >= start => {
                Some(self.activate(now, TransitionCause::StartTimer))
            }
            _ => None,
        }
    }

    /// Out-of-band start notice. Only moves a Waiting game of ours.
    pub fn on_external_start(&mut self, game_id: GameId, now: DateTime<Utc>) -> Option<Transition> {
        if game_id != self.game_id || self.phase != Phase::Waiting {
            return None;
        }
        Some(self.activate(now, TransitionCause::ExternalStart))
    }

    pub fn tick(&self, now: DateTime<Utc>) -> Tick {
        let until = |at: DateTime<Utc>| (at - now).to_std().unwrap_or(Duration::ZERO);

        let time_remaining = match self.phase {
            Phase::Waiting => self.schedule.map(|s| until(s.start_time)),
            Phase::Active => self.answer_deadline().map(until),
            Phase::Submitted => None,
        };

        Tick {
            phase: self.phase,
            time_remaining,
        }
    }

    /// Moves Active -> Submitted. Submission happens at most once.
    pub fn begin_submit(&mut self, cause: TransitionCause, now: DateTime<Utc>) -> Result<Transition> {
        match self.phase {
            Phase::Active => {
                self.phase = Phase::Submitted;
                tracing::info!("Game {} submitted ({:?})", self.game_id, cause);
                Ok(Transition {
                    from: Phase::Active,
                    to: Phase::Submitted,
                    at: now,
                    cause,
                })
            }
            Phase::Waiting => Err(WinWalletError::NotActive {
                game_id: self.game_id,
                phase: self.phase,
            }),
            Phase::Submitted => Err(WinWalletError::AlreadySubmitted {
                game_id: self.game_id,
            }),
        }
    }

    fn activate(&mut self, now: DateTime<Utc>, cause: TransitionCause) -> Transition {
        self.pending_start = None;
        self.phase = Phase::Active;
        self.activated_at = Some(now);
        tracing::info!("Game {} is active ({:?})", self.game_id, cause);
        Transition {
            from: Phase::Waiting,
            to: Phase::Active,
            at: now,
            cause,
        }
    }
}
