//! Error types shared by every crate

use thiserror::Error;

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
///
/// Backend implementations return these; the clients above them absorb
/// failures into result-with-status values.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Input rejected: {0}")]
    InputRejected(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty result: {0}")]
    Empty(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Answer service error: {0}")]
    Answer(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Whether a retry of the same request could plausibly succeed
    ///
    /// Network failures, timeouts, throttling, server errors and unparseable
    /// bodies are transient. Other 4xx responses and rejected input are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(_) | Error::Timeout(_) | Error::InvalidResponse(_) => true,
            Error::Endpoint { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InputRejected(_) => "input_rejected",
            Error::Auth(_) => "auth",
            Error::Network(_) => "network",
            Error::Timeout(_) => "timeout",
            Error::Endpoint { .. } => "endpoint",
            Error::InvalidResponse(_) => "invalid_response",
            Error::Empty(_) => "empty",
            Error::Audio(_) => "audio",
            Error::Answer(_) => "answer",
            Error::Configuration(_) => "configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Network("reset".into()).is_transient());
        assert!(Error::Timeout("30s".into()).is_transient());
        assert!(Error::InvalidResponse("not json".into()).is_transient());
        assert!(Error::Endpoint { status: 503, body: String::new() }.is_transient());
        assert!(Error::Endpoint { status: 429, body: String::new() }.is_transient());

        assert!(!Error::Endpoint { status: 400, body: String::new() }.is_transient());
        assert!(!Error::Auth("403".into()).is_transient());
        assert!(!Error::Empty("transcript".into()).is_transient());
    }
}
