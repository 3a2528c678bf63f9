//! Stream messages
//!
//! The filter stream interleaves tweets with out-of-band notices. Each
//! delimited line decodes into exactly one `StreamMessage`; the discriminating
//! key is checked in the same order the stream documents them.

use serde::Deserialize;
use serde_json::Value;

use crate::Result;
use crate::error::ProtocolError;
use crate::tweet::Tweet;

/// Stall warning: the client is falling behind the stream
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StallWarning {
    /// Warning code (e.g. `FALLING_BEHIND`)
    #[serde(default)]
    pub code: String,
    /// Human readable message
    #[serde(default)]
    pub message: String,
    /// How full the server-side queue is
    #[serde(default)]
    pub percent_full: Option<u32>,
}

/// Server is about to close the connection
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Disconnect {
    /// Disconnect code
    #[serde(default)]
    pub code: u32,
    /// Name of the stream being closed
    #[serde(default)]
    pub stream_name: String,
    /// Human readable reason
    #[serde(default)]
    pub reason: String,
}

/// One decoded line of the filter stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// A tweet matching the track predicate
    Tweet(Box<Tweet>),
    /// Stall warning, informational
    Warning(StallWarning),
    /// Number of matching tweets withheld by rate limiting
    Limit {
        /// Undelivered tweet count since the connection opened
        track: u64,
    },
    /// Server-initiated disconnect
    Disconnect(Disconnect),
    /// Any other notice (deletes, withheld content, ...)
    Other(Value),
}

impl StreamMessage {
    /// Decode a single delimited line
    pub fn decode(line: &[u8]) -> Result<Self> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return Err(ProtocolError::Empty);
        }

        let mut value: Value = serde_json::from_slice(line)?;

        let Some(object) = value.as_object_mut() else {
            return Ok(Self::Other(value));
        };

        if let Some(warning) = object.remove("warning") {
            return Ok(Self::Warning(serde_json::from_value(warning)?));
        }

        if let Some(disconnect) = object.remove("disconnect") {
            return Ok(Self::Disconnect(serde_json::from_value(disconnect)?));
        }

        if let Some(limit) = object.get("limit") {
            let track = limit.get("track").and_then(Value::as_u64).unwrap_or(0);
            return Ok(Self::Limit { track });
        }

        let is_tweet = object.contains_key("id")
            && object.contains_key("user")
            && (object.contains_key("text") || object.contains_key("full_text"));

        if is_tweet {
            return Ok(Self::Tweet(Box::new(serde_json::from_value(value)?)));
        }

        Ok(Self::Other(value))
    }

    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tweet(_) => "tweet",
            Self::Warning(_) => "warning",
            Self::Limit { .. } => "limit",
            Self::Disconnect(_) => "disconnect",
            Self::Other(_) => "other",
        }
    }
}
