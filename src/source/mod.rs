//! External collaborators: the bulk-read service and the push channel.
//!
//! The dashboard never talks to the network directly. It is handed a
//! [`SensorApi`] for the two bulk reads and a [`PushChannel`] for live
//! events, which makes both replaceable by in-memory doubles.
//!
//! - [`HttpSensorApi`]: `GET <base>/alerts` and `GET <base>/records` via reqwest
//! - [`StaticSensorApi`]: fixed payloads, for tests and demos
//! - [`WebSocketPush`]: WebSocket push channel with Socket.IO or JSON framing
//! - [`ChannelPush`]: push events fed from an in-process channel

mod channel;
mod http;
mod memory;
pub mod socketio;
mod subscription;
mod websocket;

pub use channel::{ChannelPush, PushSender};
pub use http::HttpSensorApi;
pub use memory::StaticSensorApi;
pub use subscription::{CancelHandle, Subscription};
pub use websocket::{FrameOutcome, WebSocketPush};

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::{Alert, Record};
use crate::error::{PushError, RetrievalError};

/// Bulk reads against the alert/record service.
///
/// # Example
///
/// ```
/// use prevenix_dashboard::{SensorApi, StaticSensorApi};
///
/// # tokio_test::block_on(async {
/// let api = StaticSensorApi::new(vec![], vec![]);
/// let alerts = api.fetch_alerts().await.unwrap();
/// assert!(alerts.is_empty());
/// # });
/// ```
#[async_trait]
pub trait SensorApi: Send + Sync + Debug {
    /// Fetch every alert, newest first.
    async fn fetch_alerts(&self) -> Result<Vec<Alert>, RetrievalError>;

    /// Fetch every record, newest first.
    async fn fetch_records(&self) -> Result<Vec<Record>, RetrievalError>;

    /// Returns a human-readable description of the service.
    fn description(&self) -> &str;
}

/// A persistent, server-initiated event connection.
///
/// `subscribe` establishes the connection and returns a [`Subscription`]
/// that owns it. Implementations that spawn background tasks must be
/// called from within a tokio runtime.
pub trait PushChannel: Send + Debug {
    /// Open the connection. A channel can be subscribed once.
    fn subscribe(&mut self) -> Result<Subscription, PushError>;

    /// Returns a human-readable description of the channel.
    fn description(&self) -> &str;
}

/// An inbound event on the push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// `newAlert`: a new alert from the service.
    NewAlert(Alert),
    /// `newRecord`: a new sensor reading.
    NewRecord(Record),
}

impl PushEvent {
    pub const NEW_ALERT: &'static str = "newAlert";
    pub const NEW_RECORD: &'static str = "newRecord";

    /// Build an event from its name and JSON payload.
    ///
    /// Returns `Ok(None)` for event names this dashboard does not handle.
    pub fn from_parts(
        name: &str,
        payload: serde_json::Value,
    ) -> Result<Option<Self>, serde_json::Error> {
        match name {
            Self::NEW_ALERT => serde_json::from_value(payload).map(|a| Some(PushEvent::NewAlert(a))),
            Self::NEW_RECORD => {
                serde_json::from_value(payload).map(|r| Some(PushEvent::NewRecord(r)))
            }
            _ => Ok(None),
        }
    }

    /// The wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            PushEvent::NewAlert(_) => Self::NEW_ALERT,
            PushEvent::NewRecord(_) => Self::NEW_RECORD,
        }
    }
}

/// How events are framed on the WebSocket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// Engine.IO v4 / Socket.IO packets (`42["newAlert",{...}]`).
    #[default]
    SocketIo,
    /// One JSON envelope per text frame (`{"event":"newAlert","data":{...}}`).
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_from_parts() {
        let event = PushEvent::from_parts(
            "newRecord",
            json!({"sensor": "Vibration", "value": 35, "timestamp": 0}),
        )
        .unwrap()
        .unwrap();

        match event {
            PushEvent::NewRecord(record) => {
                assert_eq!(record.sensor, "Vibration");
                assert_eq!(record.value, 35.0);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let event = PushEvent::from_parts("heartbeat", json!({})).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(PushEvent::from_parts("newRecord", json!({"sensor": "x"})).is_err());
    }

    #[test]
    fn test_framing_names() {
        assert_eq!(serde_json::to_string(&Framing::SocketIo).unwrap(), "\"socketio\"");
        assert_eq!(serde_json::from_str::<Framing>("\"json\"").unwrap(), Framing::Json);
    }
}
