//! Error types for the tap crate

use std::io;
use thiserror::Error;

/// Errors that can occur in the tap system
#[derive(Error, Debug)]
pub enum TapError {
    /// I/O error (socket operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Could not bind the listener
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Protocol error (malformed frames)
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Subscriber's outbound buffer is full
    #[error("subscriber {id} is lagging, frame dropped")]
    Lagging { id: u64 },

    /// Subscriber's connection task has gone away
    #[error("subscriber {id} channel closed")]
    ChannelClosed { id: u64 },
}

/// Result type for tap operations
pub type Result<T> = std::result::Result<T, TapError>;
