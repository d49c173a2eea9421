//! Engine.IO v4 / Socket.IO packet codec for the WebSocket transport.
//!
//! Only the parts a receive-only client needs are implemented: the
//! Engine.IO open/ping/close packets and Socket.IO connect, disconnect and
//! event packets. Binary attachments are not supported.
//!
//! ```text
//! server                              client
//!   │ 0{"sid":..,"pingInterval":..}      │
//!   │ ──────────────────────────────────▶│
//!   │                                 40 │
//!   │◀────────────────────────────────── │
//!   │ 40{"sid":..}                       │
//!   │ 42["newRecord",{...}]              │
//!   │ 2                                  │
//!   │ ──────────────────────────────────▶│
//!   │                                  3 │
//!   │◀────────────────────────────────── │
//! ```

use serde_json::Value;
use url::Url;

use crate::error::PushError;

/// Engine.IO protocol revision spoken by this client.
pub const ENGINE_IO_VERSION: &str = "4";

/// Default Socket.IO namespace.
pub const DEFAULT_NAMESPACE: &str = "/";

/// An Engine.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    /// Handshake, carrying the session parameters as JSON.
    Open(String),
    Close,
    Ping(String),
    Pong(String),
    /// A Socket.IO packet.
    Message(String),
    Upgrade,
    Noop,
}

/// A Socket.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack: u64,
    },
    ConnectError {
        namespace: String,
        message: String,
    },
}

/// Decode one Engine.IO text frame.
pub fn decode_engine(frame: &str) -> Result<EnginePacket, PushError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or_else(|| PushError::Frame("empty frame".to_string()))?;
    let rest = chars.as_str().to_string();

    match kind {
        '0' => Ok(EnginePacket::Open(rest)),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(rest)),
        '3' => Ok(EnginePacket::Pong(rest)),
        '4' => Ok(EnginePacket::Message(rest)),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(PushError::Frame(format!("unknown engine packet type {:?}", other))),
    }
}

/// Decode the Socket.IO packet carried in an Engine.IO message.
pub fn decode_socket(payload: &str) -> Result<SocketPacket, PushError> {
    let mut chars = payload.chars();
    let kind = chars.next().ok_or_else(|| PushError::Frame("empty packet".to_string()))?;
    let mut rest = chars.as_str();

    if matches!(kind, '5' | '6') {
        return Err(PushError::Frame("binary packets are not supported".to_string()));
    }

    let namespace = if rest.starts_with('/') {
        let (ns, tail) = rest.split_once(',').unwrap_or((rest, ""));
        rest = tail;
        ns.to_string()
    } else {
        DEFAULT_NAMESPACE.to_string()
    };

    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let ack = if digits > 0 {
        let id = rest[..digits]
            .parse::<u64>()
            .map_err(|e| PushError::Frame(format!("bad ack id: {}", e)))?;
        rest = &rest[digits..];
        Some(id)
    } else {
        None
    };

    let data = if rest.is_empty() {
        None
    } else {
        Some(
            serde_json::from_str::<Value>(rest)
                .map_err(|e| PushError::Frame(format!("bad packet data: {}", e)))?,
        )
    };

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let Some(Value::Array(mut items)) = data else {
                return Err(PushError::Frame("event data is not an array".to_string()));
            };
            if items.is_empty() {
                return Err(PushError::Frame("event without a name".to_string()));
            }
            let Value::String(name) = items.remove(0) else {
                return Err(PushError::Frame("event name is not a string".to_string()));
            };
            Ok(SocketPacket::Event {
                namespace,
                ack,
                name,
                args: items,
            })
        }
        '3' => Ok(SocketPacket::Ack {
            namespace,
            ack: ack.ok_or_else(|| PushError::Frame("ack without id".to_string()))?,
        }),
        '4' => {
            let message = match data {
                Some(Value::Object(map)) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("connection refused")
                    .to_string(),
                Some(Value::String(message)) => message,
                _ => "connection refused".to_string(),
            };
            Ok(SocketPacket::ConnectError { namespace, message })
        }
        other => Err(PushError::Frame(format!("unknown socket packet type {:?}", other))),
    }
}

/// The namespace connect request sent after the Engine.IO handshake.
pub fn connect_packet(namespace: &str) -> String {
    if namespace == DEFAULT_NAMESPACE {
        "40".to_string()
    } else {
        format!("40{},", namespace)
    }
}

/// The pong answering a ping with `payload`.
pub fn pong(payload: &str) -> String {
    format!("3{}", payload)
}

/// Build the WebSocket endpoint for a Socket.IO server URL.
///
/// `http://host:4000` becomes `ws://host:4000/socket.io/?EIO=4&transport=websocket`.
/// An explicit path other than `/` is kept as the Socket.IO path.
pub fn endpoint(raw: &str) -> Result<Url, PushError> {
    let mut url = websocket_url(raw)?;
    if url.path().is_empty() || url.path() == "/" {
        url.set_path("/socket.io/");
    }
    url.query_pairs_mut()
        .append_pair("EIO", ENGINE_IO_VERSION)
        .append_pair("transport", "websocket");
    Ok(url)
}

/// Parse a URL and map http(s) onto ws(s).
pub fn websocket_url(raw: &str) -> Result<Url, PushError> {
    let invalid = |reason: String| PushError::Endpoint {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(invalid(format!("unsupported scheme {:?}", other))),
    };
    url.set_scheme(scheme).map_err(|_| invalid("cannot change scheme".to_string()))?;
    Ok(url)
}
