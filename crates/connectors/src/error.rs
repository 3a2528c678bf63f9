//! Error types for connectors

use thiserror::Error;
use tweetcast_protocol::ProtocolError;

/// Errors that can occur while opening or reading a stream
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Failed to initialize connector (e.g., HTTP client creation failed)
    #[error("failed to initialize connector: {0}")]
    Init(String),

    /// HTTP request or body read failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A single stream line could not be decoded
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Credentials rejected by the stream endpoint
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Endpoint is rate limiting this client
    #[error("rate limited (HTTP {status})")]
    RateLimited { status: u16 },

    /// Any other non-success HTTP status
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// No data (not even keep-alives) within the stall timeout
    #[error("stream stalled for {secs}s")]
    Stalled { secs: u64 },

    /// Connecting took longer than the configured timeout
    #[error("connect timed out after {secs}s")]
    Timeout { secs: u64 },

    /// A single line exceeded the maximum accepted size
    #[error("stream line exceeds {max} bytes")]
    LineTooLong { max: usize },

    /// Server closed the stream
    #[error("stream disconnected: {0}")]
    Disconnected(String),

    /// Connector cannot open a stream right now
    #[error("connector unavailable: {0}")]
    Unavailable(String),
}

impl ConnectorError {
    /// Errors that must not be retried
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AuthFailed(_) | Self::Init(_))
    }

    /// Errors scoped to one stream line; the connection itself is still usable
    pub fn is_message_error(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}
