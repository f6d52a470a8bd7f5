//! Outbound transport for the voice pipeline
//!
//! Everything the STT, translation and TTS clients share:
//! - [`ApiClient`]: one `reqwest` client with a settled authentication scheme
//! - [`RetryPolicy`]: bounded fixed-backoff retry of transient failures
//! - [`WorkerPool`]: bounded fan-out with index-addressed result slots

pub mod client;
pub mod pool;
pub mod retry;

pub use client::ApiClient;
pub use pool::WorkerPool;
pub use retry::RetryPolicy;

use thiserror::Error;

/// Longest response body kept in an error message
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 300;

/// Transport errors
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Every authentication scheme was rejected (tried: {0})")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_decode() {
            TransportError::InvalidResponse(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl From<TransportError> for agri_voice_core::Error {
    fn from(err: TransportError) -> Self {
        use agri_voice_core::Error;
        match err {
            TransportError::MissingApiKey => Error::Auth("no API key configured".to_string()),
            TransportError::Auth(tried) => Error::Auth(tried),
            TransportError::Network(msg) => Error::Network(msg),
            TransportError::Timeout => Error::Timeout("request timed out".to_string()),
            TransportError::Status { status, body } => Error::Endpoint { status, body },
            TransportError::InvalidResponse(msg) => Error::InvalidResponse(msg),
            TransportError::Configuration(msg) => Error::Configuration(msg),
        }
    }
}

/// Truncate a body for logging and error messages
pub(crate) fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", cut)
    }
}
