//! Wire protocol for subscriber connections
//!
//! Every WebSocket text frame is a JSON object with an event name and a
//! string payload:
//!
//! ```text
//! {"event": "tweet", "data": "{\"id\":1,\"text\":\"...\"}"}
//! ```
//!
//! # Server → Client
//!
//! - `tweet`: `data` is the serialized event, forwarded verbatim
//!
//! # Client → Server
//!
//! - `join`: `data` is a group name to add this connection to
//! - `leave`: `data` is a group name to remove this connection from

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TapError};

/// Longest group name a client may join
pub const MAX_GROUP_NAME: usize = 64;

#[derive(Serialize)]
struct Frame<'a> {
    event: &'a str,
    data: &'a str,
}

/// Encode an outbound frame
///
/// The result is shared by every subscriber the frame is delivered to.
pub fn encode_frame(event: &str, data: &str) -> Result<Arc<str>> {
    serde_json::to_string(&Frame { event, data })
        .map(Arc::from)
        .map_err(|e| TapError::Protocol(e.to_string()))
}

/// Frames a client may send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Join a broadcast group
    Join(String),
    /// Leave a broadcast group
    Leave(String),
}

impl ClientMessage {
    /// Decode and validate a client text frame
    pub fn decode(text: &str) -> Result<Self> {
        let message: Self =
            serde_json::from_str(text).map_err(|e| TapError::Protocol(e.to_string()))?;

        let group = message.group();
        if group.trim().is_empty() {
            return Err(TapError::Protocol("group name is empty".into()));
        }
        if group.len() > MAX_GROUP_NAME {
            return Err(TapError::Protocol(format!(
                "group name exceeds {} bytes",
                MAX_GROUP_NAME
            )));
        }

        Ok(message)
    }

    /// Encode for sending to a server
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| TapError::Protocol(e.to_string()))
    }

    /// Group named by the message
    pub fn group(&self) -> &str {
        match self {
            Self::Join(group) | Self::Leave(group) => group,
        }
    }
}

#[cfg(test)]
#[path = "protocol_test.rs"]
mod tests;
