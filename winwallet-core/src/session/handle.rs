use super::{SessionCommand, SessionEvent};
use crate::error::{Result, WinWalletError};
use tokio::sync::mpsc;

/// Cloneable sender for session commands. The blocking variants are for
/// prompt threads outside the runtime.
#[derive(Debug, Clone)]
pub struct SessionCommands {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionCommands {
    pub async fn answer(&self, index: usize, answer: impl Into<String>) -> Result<()> {
        self.send(SessionCommand::Answer {
            index,
            answer: answer.into(),
        })
        .await
    }

    pub async fn submit(&self) -> Result<()> {
        self.send(SessionCommand::Submit).await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.send(SessionCommand::Refresh).await
    }

    pub fn blocking_answer(&self, index: usize, answer: impl Into<String>) -> Result<()> {
        self.tx
            .blocking_send(SessionCommand::Answer {
                index,
                answer: answer.into(),
            })
            .map_err(|_| session_gone())
    }

    pub fn blocking_submit(&self) -> Result<()> {
        self.tx
            .blocking_send(SessionCommand::Submit)
            .map_err(|_| session_gone())
    }

    async fn send(&self, command: SessionCommand) -> Result<()> {
        self.tx.send(command).await.map_err(|_| session_gone())
    }
}

pub struct SessionHandle {
    commands: SessionCommands,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionHandle {
    pub(super) fn new(
        tx: mpsc::Sender<SessionCommand>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Self {
        Self {
            commands: SessionCommands { tx },
            events,
        }
    }

    pub fn commands(&self) -> SessionCommands {
        self.commands.clone()
    }

    /// `None` once the session has finished and its events are drained.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Splits the handle so events and commands can live on different tasks.
    pub fn into_parts(self) -> (SessionCommands, mpsc::UnboundedReceiver<SessionEvent>) {
        (self.commands, self.events)
    }
}

fn session_gone() -> WinWalletError {
    WinWalletError::internal("Game session has ended")
}
