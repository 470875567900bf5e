//! Real-time event channel.
//!
//! Frames are JSON text messages shaped `{"event": <name>, "data": {...}}`.
//! A [`PushChannel`] is an owned connection: screens subscribe to it and
//! drop their [`Subscription`] to stop listening, and dropping the channel
//! tears the connection down.

pub mod events;

pub use events::{ClientMessage, PlayerJoined, PushEvent};

use crate::error::{Result, WinWalletError};
use crate::types::GameId;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

const EVENT_BUFFER: usize = 64;

pub struct PushChannel {
    url: String,
    outbound: Option<mpsc::UnboundedSender<ClientMessage>>,
    // kept so new subscriptions can be made after the reader owns the sender
    template: broadcast::Receiver<PushEvent>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl PushChannel {
    pub async fn connect(url: &str) -> Result<Self> {
        tracing::info!("Connecting push channel to {}", url);
        let (ws_stream, _) = connect_async(url).await?;
        let (mut sink, mut stream) = ws_stream.split();

        let (events_tx, template) = broadcast::channel(EVENT_BUFFER);
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientMessage>();

        let writer = tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("Dropping unserializable push message: {}", e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text)).await {
                    tracing::warn!("Push channel send failed: {}", e);
                    return;
                }
            }
            let _ = sink.send(Message::Close(None)).await;
        });

        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<PushEvent>(&text) {
                        Ok(event) => {
                            tracing::debug!("Push event: {:?}", event);
                            // no subscribers is fine
                            let _ = events_tx.send(event);
                        }
                        Err(e) => tracing::debug!("Ignoring push frame {}: {}", text, e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Push channel read failed: {}", e);
                        break;
                    }
                }
            }
            tracing::info!("Push channel closed");
        });

        Ok(Self {
            url: url.to_string(),
            outbound: Some(outbound_tx),
            template,
            reader: Some(reader),
            writer: Some(writer),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.template.resubscribe())
    }

    pub fn emit(&self, message: ClientMessage) -> Result<()> {
        self.outbound
            .as_ref()
            .ok_or_else(|| WinWalletError::push("Push channel is disconnected"))?
            .send(message)
            .map_err(|_| WinWalletError::push("Push channel writer has stopped"))
    }

    /// Asks the server to route this game's room events to us.
    pub fn join(&self, game_id: GameId) -> Result<()> {
        self.emit(ClientMessage::Join { game_id })
    }

    /// Sends a close frame and waits for the writer to finish.
    pub async fn disconnect(mut self) {
        // closing the outbound queue makes the writer send the close frame
        self.outbound.take();
        if let Some(writer) = self.writer.take() {
            let _ = writer.await;
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        tracing::info!("Disconnected push channel from {}", self.url);
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if let Some(writer) = self.writer.take() {
            writer.abort();
        }
    }
}

/// A listener on a push channel. Dropping it detaches the listener.
pub struct Subscription {
    receiver: broadcast::Receiver<PushEvent>,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<PushEvent>) -> Self {
        Self { receiver }
    }

    /// Next event, or `None` once the connection has ended and everything
    /// buffered has been read.
    pub async fn recv(&mut self) -> Option<PushEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Subscriber lagged, {} push events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
