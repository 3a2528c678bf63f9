//! Event source errors

use thiserror::Error;
use tweetcast_connectors::ConnectorError;

/// Errors surfaced by the event source adapter
#[derive(Error, Debug)]
pub enum SourceError {
    /// The initial stream could not be opened
    #[error("failed to open {connector} stream: {source}")]
    Connect {
        connector: &'static str,
        #[source]
        source: ConnectorError,
    },

    /// The stream was lost mid-run and could not be recovered
    #[error("stream failed after {attempts} reconnect attempt(s): {reason}")]
    StreamFailed { attempts: u32, reason: String },

    /// The receive loop panicked or was aborted
    #[error("source task failed: {0}")]
    Task(String),
}

impl SourceError {
    /// Whether this error was caused by rejected credentials
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Connect {
                source: ConnectorError::AuthFailed(_),
                ..
            }
        )
    }
}
