//! Context Explainer Error Types
//!
//! Validation errors from the capture state machine, upstream errors from the
//! relay, and the crate-wide error that wraps both.

use thiserror::Error;

/// Rejection of a capture step. The session state is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("selection too short: {len} characters (need more than 3)")]
    TooShort { len: usize },

    #[error("no text selected for context")]
    EmptySelection,

    #[error("context must include the original selection")]
    ContextDoesNotContainWord,

    #[error("no initial selection found, select a word or phrase first")]
    NoPendingWord,
}

/// Failure of a relay call. Terminal for the current request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("upstream returned HTTP {0}")]
    UpstreamHttpError(u16),

    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("no OpenRouter API key configured")]
    MissingApiKey,

    /// Failure reported by a relay on the other side of the socket.
    #[error("{0}")]
    Remote(String),
}

/// Central error type for Context Explainer
#[derive(Error, Debug)]
pub enum ExplainerError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Context Explainer operations
pub type ExplainerResult<T> = Result<T, ExplainerError>;

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RelayError::UpstreamHttpError(status.as_u16()),
            None if err.is_decode() => RelayError::MalformedResponse(err.to_string()),
            None => RelayError::UpstreamUnreachable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_messages() {
        assert_eq!(
            CaptureError::TooShort { len: 2 }.to_string(),
            "selection too short: 2 characters (need more than 3)"
        );
        assert!(CaptureError::NoPendingWord.to_string().contains("select a word"));
    }

    #[test]
    fn test_relay_error_wraps_into_explainer_error() {
        let err: ExplainerError = RelayError::UpstreamHttpError(500).into();
        assert!(matches!(
            err,
            ExplainerError::Relay(RelayError::UpstreamHttpError(500))
        ));
        assert_eq!(err.to_string(), "upstream returned HTTP 500");
    }
}
