//! Protocol error types

use thiserror::Error;

/// Errors that can occur while decoding stream messages or encoding events
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Line is not valid JSON or does not match the expected shape
    #[error("invalid stream message: {0}")]
    Json(#[from] serde_json::Error),

    /// Line contained only whitespace
    #[error("empty stream message")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ProtocolError::Empty.to_string(), "empty stream message");

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ProtocolError::from(json_err);
        assert!(err.to_string().starts_with("invalid stream message"));
    }
}
