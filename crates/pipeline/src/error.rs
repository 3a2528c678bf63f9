//! Pipeline error types

use thiserror::Error;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Event could not be turned into a wire frame
    #[error("failed to encode event {id}: {message}")]
    Encode { id: String, message: String },
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::Encode {
            id: "42".into(),
            message: "bad utf-8".into(),
        };
        assert_eq!(err.to_string(), "failed to encode event 42: bad utf-8");
    }
}
