//! WebSocket push channel.
//!
//! Spawns a background task that holds the connection, decodes frames
//! according to the configured [`Framing`], answers protocol keepalives and
//! forwards `newAlert` / `newRecord` events to the [`Subscription`].
//! Releasing the subscription closes the socket.
//!
//! The socket is read continuously. Events the dashboard has not yet taken
//! (for instance while a notice is pending) wait in an in-task backlog, so
//! keepalives are still answered and nothing is dropped.

use std::collections::VecDeque;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

use super::socketio::{self, EnginePacket, SocketPacket, DEFAULT_NAMESPACE};
use super::{CancelHandle, Framing, PushChannel, PushEvent, Subscription};
use crate::config::PushSettings;
use crate::error::PushError;

/// Events handed over to the subscription ahead of the dashboard. Anything
/// beyond this waits in the connection task's backlog.
const EVENT_BUFFER: usize = 256;

/// A push channel over a WebSocket connection.
#[derive(Debug)]
pub struct WebSocketPush {
    endpoint: Url,
    framing: Framing,
    description: String,
    subscribed: bool,
}

impl WebSocketPush {
    /// Create a channel for `url` (http, https, ws or wss).
    pub fn new(url: &str, framing: Framing) -> Result<Self, PushError> {
        let endpoint = match framing {
            Framing::SocketIo => socketio::endpoint(url)?,
            Framing::Json => socketio::websocket_url(url)?,
        };
        Ok(Self {
            description: format!("push: {}", url),
            endpoint,
            framing,
            subscribed: false,
        })
    }

    pub fn from_settings(settings: &PushSettings) -> Result<Self, PushError> {
        Self::new(&settings.url, settings.framing)
    }

    /// The WebSocket URL actually dialled.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl PushChannel for WebSocketPush {
    fn subscribe(&mut self) -> Result<Subscription, PushError> {
        if self.subscribed {
            return Err(PushError::Closed);
        }
        self.subscribed = true;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let endpoint = self.endpoint.clone();
        let framing = self.framing;

        tokio::spawn(async move {
            match run_connection(endpoint, framing, tx, shutdown_rx).await {
                Ok(()) => info!("push channel released"),
                Err(e) => warn!(error = %e, "push channel ended"),
            }
        });

        let cancel = CancelHandle::new(move || {
            let _ = shutdown_tx.send(());
        });
        Ok(Subscription::new(rx, cancel))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

async fn run_connection(
    endpoint: Url,
    framing: Framing,
    tx: mpsc::Sender<PushEvent>,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<(), PushError> {
    info!(%endpoint, "connecting push channel");

    let (stream, _) = tokio::select! {
        _ = &mut shutdown => return Ok(()),
        connected = connect_async(endpoint.as_str()) => {
            connected.map_err(|e| PushError::Connect(e.to_string()))?
        }
    };
    let (mut write, mut read) = stream.split();
    info!(%endpoint, "push channel connected");

    let mut backlog: VecDeque<PushEvent> = VecDeque::new();

    let ended = loop {
        tokio::select! {
            _ = &mut shutdown => {
                let _ = write.send(Message::Close(None)).await;
                return Ok(());
            }
            permit = tx.reserve(), if !backlog.is_empty() => {
                let Ok(permit) = permit else {
                    // Subscription dropped
                    return Ok(());
                };
                if let Some(event) = backlog.pop_front() {
                    permit.send(event);
                }
            }
            frame = read.next() => {
                let text = match frame {
                    None | Some(Ok(Message::Close(_))) => break PushError::Closed,
                    Some(Err(e)) => break PushError::Connect(e.to_string()),
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(_)) => continue,
                };

                let outcome = match framing.decode(&text) {
                    Ok(outcome) => outcome,
                    Err(PushError::Frame(reason)) => {
                        warn!(%reason, "skipping malformed push frame");
                        continue;
                    }
                    Err(e) => break e,
                };

                if let Some(reply) = outcome.reply {
                    if let Err(e) = write.send(Message::Text(reply)).await {
                        break PushError::Connect(e.to_string());
                    }
                }
                if let Some(event) = outcome.event {
                    debug!(event = event.name(), backlog = backlog.len(), "push event received");
                    backlog.push_back(event);
                }
                if outcome.closed {
                    break PushError::Closed;
                }
            }
        }
    };

    // The connection is gone; still hand over what it delivered.
    while let Some(event) = backlog.pop_front() {
        tokio::select! {
            _ = &mut shutdown => return Ok(()),
            sent = tx.send(event) => {
                if sent.is_err() {
                    return Ok(());
                }
            }
        }
    }
    Err(ended)
}

/// What a single text frame asks of the connection.
#[derive(Debug, Default, PartialEq)]
pub struct FrameOutcome {
    /// Frame to send back (handshake or keepalive).
    pub reply: Option<String>,
    /// Event to forward to the dashboard.
    pub event: Option<PushEvent>,
    /// The server ended the session.
    pub closed: bool,
}

impl FrameOutcome {
    fn reply(reply: String) -> Self {
        Self {
            reply: Some(reply),
            ..Self::default()
        }
    }

    fn closed() -> Self {
        Self {
            closed: true,
            ..Self::default()
        }
    }
}

impl Framing {
    /// Decode one text frame.
    ///
    /// [`PushError::Frame`] means the frame should be skipped; any other
    /// error ends the connection.
    pub fn decode(self, frame: &str) -> Result<FrameOutcome, PushError> {
        match self {
            Framing::SocketIo => decode_socketio(frame),
            Framing::Json => decode_json(frame),
        }
    }
}

fn decode_socketio(frame: &str) -> Result<FrameOutcome, PushError> {
    match socketio::decode_engine(frame)? {
        EnginePacket::Open(params) => {
            debug!(%params, "engine.io session opened");
            Ok(FrameOutcome::reply(socketio::connect_packet(DEFAULT_NAMESPACE)))
        }
        EnginePacket::Ping(payload) => Ok(FrameOutcome::reply(socketio::pong(&payload))),
        EnginePacket::Close => Ok(FrameOutcome::closed()),
        EnginePacket::Message(payload) => match socketio::decode_socket(&payload)? {
            SocketPacket::Connect { namespace } => {
                info!(%namespace, "socket.io namespace connected");
                Ok(FrameOutcome::default())
            }
            SocketPacket::Disconnect { .. } => Ok(FrameOutcome::closed()),
            SocketPacket::ConnectError { message, .. } => Err(PushError::Handshake(message)),
            SocketPacket::Event { name, mut args, .. } => {
                let payload = if args.is_empty() {
                    Value::Null
                } else {
                    args.remove(0)
                };
                event_outcome(&name, payload)
            }
            SocketPacket::Ack { .. } => Ok(FrameOutcome::default()),
        },
        EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {
            Ok(FrameOutcome::default())
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

fn decode_json(frame: &str) -> Result<FrameOutcome, PushError> {
    let envelope: Envelope =
        serde_json::from_str(frame).map_err(|e| PushError::Frame(e.to_string()))?;
    event_outcome(&envelope.event, envelope.data)
}

fn event_outcome(name: &str, payload: Value) -> Result<FrameOutcome, PushError> {
    let event = PushEvent::from_parts(name, payload)
        .map_err(|e| PushError::Frame(format!("{} payload: {}", name, e)))?;
    if event.is_none() {
        debug!(event = name, "ignoring unhandled push event");
    }
    Ok(FrameOutcome {
        event,
        ..FrameOutcome::default()
    })
}
