//! Agricultural voice assistant server
//!
//! HTTP endpoints for voice and text queries, translation, synthesis and
//! language detection, plus health and Prometheus metrics.

pub mod answer;
pub mod http;
pub mod metrics;
pub mod state;

pub use answer::RemoteAnswerService;
pub use http::create_router;
pub use metrics::{init_metrics, metrics_handler, record_request, record_workflow};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Voice features are disabled: {0}")]
    VoiceDisabled(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::VoiceDisabled(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<ServerError> for agri_voice_core::Error {
    fn from(err: ServerError) -> Self {
        use agri_voice_core::Error;
        match err {
            ServerError::InvalidRequest(msg) => Error::InputRejected(msg),
            ServerError::VoiceDisabled(msg) => Error::Configuration(msg),
        }
    }
}
