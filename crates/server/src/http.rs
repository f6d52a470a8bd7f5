//! HTTP Endpoints
//!
//! REST API for the voice assistant.

use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Json, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use agri_voice_core::{AudioClip, Language, TranslationResult};
use agri_voice_pipeline::{answer_text_only, VoiceWorkflow, VoiceWorkflowResult};
use agri_voice_text_processing::detect_text_language;

use crate::metrics::{metrics_handler, record_request, record_workflow};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let body_limit = server.max_body_bytes;
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        // Queries
        .route("/api/voice/query", post(voice_query))
        .route("/api/text/query", post(text_query))
        // Single stages
        .route("/api/translate", post(translate))
        .route("/api/tts", post(synthesize))
        .route("/api/detect-language", post(detect_language))
        .route("/api/languages", get(list_languages))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, any origin may call the API
/// - If no configured origin parses, defaults to localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, allowing any origin");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    let mut parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        parsed_origins.push(HeaderValue::from_static("http://localhost:3000"));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Resolve an optional language code; absent, empty or `auto` means detect
fn language_hint(code: Option<&str>) -> Option<Language> {
    match code.map(str::trim) {
        None | Some("") => None,
        Some(code) if code.eq_ignore_ascii_case("auto") => None,
        Some(code) => Some(Language::parse_or_default(code)),
    }
}

fn require_workflow(state: &AppState) -> Result<&VoiceWorkflow, ServerError> {
    state.workflow.as_deref().ok_or_else(|| {
        ServerError::VoiceDisabled(
            state
                .voice_disabled_reason
                .clone()
                .unwrap_or_else(|| "speech API unavailable".to_string()),
        )
    })
}

/// Workflow result with the audio inlined as base64
#[derive(Debug, Serialize)]
struct WorkflowResponse {
    request_id: Uuid,
    #[serde(flatten)]
    result: VoiceWorkflowResult,
    language_code: &'static str,
    audio: Option<String>,
    audio_format: Option<&'static str>,
}

impl From<VoiceWorkflowResult> for WorkflowResponse {
    fn from(mut result: VoiceWorkflowResult) -> Self {
        let audio = result.audio.take().map(|bytes| BASE64.encode(bytes));
        let audio_format = audio.as_ref().map(|_| "wav");
        Self {
            request_id: Uuid::new_v4(),
            language_code: result.language.api_code(),
            result,
            audio,
            audio_format,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VoiceQueryRequest {
    /// Base64 encoded audio in any supported container
    audio: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    synthesize: Option<bool>,
}

/// `POST /api/voice/query`
async fn voice_query(
    State(state): State<AppState>,
    Json(request): Json<VoiceQueryRequest>,
) -> Result<Json<WorkflowResponse>, ServerError> {
    record_request("voice_query");
    let workflow = require_workflow(&state)?;

    let bytes = BASE64
        .decode(request.audio.trim())
        .map_err(|e| ServerError::InvalidRequest(format!("Invalid base64 audio: {}", e)))?;
    let clip = AudioClip::new(bytes);
    let synthesize = request
        .synthesize
        .unwrap_or(state.config.workflow.synthesize_answers);

    let result = workflow
        .run_voice(&clip, language_hint(request.language.as_deref()), synthesize)
        .await;
    record_workflow(&result);

    Ok(Json(result.into()))
}

#[derive(Debug, Deserialize)]
struct TextQueryRequest {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    synthesize: Option<bool>,
}

/// `POST /api/text/query`
///
/// Works without speech services: the question is answered in English.
async fn text_query(
    State(state): State<AppState>,
    Json(request): Json<TextQueryRequest>,
) -> Result<Json<WorkflowResponse>, ServerError> {
    record_request("text_query");
    if request.text.trim().is_empty() {
        return Err(ServerError::InvalidRequest("Question text is empty".to_string()));
    }
    let hint = language_hint(request.language.as_deref());

    let result = match state.workflow.as_deref() {
        Some(workflow) => {
            let synthesize = request
                .synthesize
                .unwrap_or(state.config.workflow.synthesize_answers);
            workflow.run_text(&request.text, hint, synthesize).await
        }
        None => {
            let language = hint.unwrap_or_else(|| detect_text_language(&request.text));
            answer_text_only(state.answerer.as_ref(), &request.text, language).await
        }
    };
    record_workflow(&result);

    Ok(Json(result.into()))
}

#[derive(Debug, Deserialize)]
struct TranslateRequest {
    text: String,
    source_language: String,
    target_language: String,
}

/// `POST /api/translate`
async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslationResult>, ServerError> {
    record_request("translate");
    let workflow = require_workflow(&state)?;

    let source = Language::parse_or_default(&request.source_language);
    let target = Language::parse_or_default(&request.target_language);
    let result = workflow.translator().translate(&request.text, source, target).await;

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct TtsRequest {
    text: String,
    language: String,
}

#[derive(Debug, Serialize)]
struct TtsResponse {
    audio: Option<String>,
    success: bool,
    chunks_total: usize,
    chunks_failed: usize,
    truncated: bool,
}

/// `POST /api/tts`
async fn synthesize(
    State(state): State<AppState>,
    Json(request): Json<TtsRequest>,
) -> Result<Json<TtsResponse>, ServerError> {
    record_request("tts");
    let workflow = require_workflow(&state)?;

    let language = Language::parse_or_default(&request.language);
    let result = workflow.synthesizer().synthesize(&request.text, language).await;

    Ok(Json(TtsResponse {
        audio: result.success.then(|| BASE64.encode(&result.audio)),
        success: result.success,
        chunks_total: result.chunks_total,
        chunks_failed: result.chunks_failed,
        truncated: result.truncated,
    }))
}

#[derive(Debug, Deserialize)]
struct DetectLanguageRequest {
    text: String,
}

#[derive(Debug, Serialize)]
struct LanguageInfo {
    language: Language,
    code: &'static str,
    name: &'static str,
    display_name: &'static str,
}

impl From<Language> for LanguageInfo {
    fn from(language: Language) -> Self {
        Self {
            language,
            code: language.api_code(),
            name: language.name(),
            display_name: language.display_name(),
        }
    }
}

/// `POST /api/detect-language`
async fn detect_language(Json(request): Json<DetectLanguageRequest>) -> Json<LanguageInfo> {
    record_request("detect_language");
    Json(detect_text_language(&request.text).into())
}

/// `GET /api/languages`
async fn list_languages() -> Json<serde_json::Value> {
    let languages: Vec<LanguageInfo> = Language::all().iter().map(|&l| l.into()).collect();
    Json(serde_json::json!({
        "count": languages.len(),
        "languages": languages,
    }))
}

/// `GET /health`
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let voice_enabled = state.voice_enabled();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": if voice_enabled { "healthy" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "voice_enabled": voice_enabled,
            "voice_disabled_reason": state.voice_disabled_reason,
            "answer_service": state.config.answer.url,
            "max_concurrent_requests": state.workflow.as_ref().map(|w| w.pool().capacity()),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_hint() {
        assert_eq!(language_hint(None), None);
        assert_eq!(language_hint(Some("  ")), None);
        assert_eq!(language_hint(Some("AUTO")), None);
        assert_eq!(language_hint(Some("hi-IN")), Some(Language::Hindi));
        assert_eq!(language_hint(Some("klingon")), Some(Language::English));
    }

    #[test]
    fn test_cors_layer_falls_back_on_bad_origins() {
        let _ = build_cors_layer(&["not a header\n".to_string()], true);
        let _ = build_cors_layer(&[], false);
    }
}
