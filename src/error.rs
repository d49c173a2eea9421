//! Error types for retrieval, the push channel, and notifications.

use thiserror::Error;

/// A bulk fetch was rejected or the service was unreachable.
///
/// Recovered locally: the dashboard logs it and keeps its prior state.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("service returned status {0}")]
    Status(u16),

    /// Failed to parse response.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("request timed out")]
    Timeout,

    /// The configured endpoint is not a valid URL.
    #[error("invalid endpoint {url}: {reason}")]
    Endpoint { url: String, reason: String },
}

impl From<reqwest::Error> for RetrievalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RetrievalError::Timeout
        } else if err.is_connect() {
            RetrievalError::Connection(err.to_string())
        } else if err.is_decode() {
            RetrievalError::Parse(err.to_string())
        } else {
            RetrievalError::Http(err.to_string())
        }
    }
}

/// The push channel could not be established or broke down.
#[derive(Debug, Error)]
pub enum PushError {
    /// The configured endpoint is not usable for a WebSocket connection.
    #[error("invalid push endpoint {url}: {reason}")]
    Endpoint { url: String, reason: String },

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server refused the Socket.IO namespace connection.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// A frame could not be decoded.
    #[error("malformed frame: {0}")]
    Frame(String),

    /// The subscription's buffer is full; the event was not queued.
    #[error("push channel buffer full")]
    Full,

    /// The channel was closed by the server or already consumed.
    #[error("push channel closed")]
    Closed,
}

/// An alert could not be turned into a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NoticeError {
    /// The alert lacks a message or a value.
    #[error("alert has no message or value")]
    PayloadMissing,
}
