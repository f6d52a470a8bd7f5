//! Prometheus metrics
//!
//! - `agri_voice_requests_total{route}`
//! - `agri_voice_stage_latency_ms{stage}`
//! - `agri_voice_workflow_latency_ms`
//! - `agri_voice_workflows_total{outcome}`
//! - `agri_voice_workflow_warnings_total{kind}`

use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use agri_voice_pipeline::{VoiceWorkflowResult, WorkflowStage};

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once per process
pub fn init_metrics() -> Option<PrometheusHandle> {
    HANDLE
        .get_or_try_init(|| PrometheusBuilder::new().install_recorder())
        .map(Clone::clone)
        .map_err(|e| tracing::warn!(error = %e, "Failed to install Prometheus recorder"))
        .ok()
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match HANDLE.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::OK, String::new()),
    }
}

pub fn record_request(route: &'static str) {
    metrics::counter!("agri_voice_requests_total", "route" => route).increment(1);
}

/// Record stage latencies, outcome and warnings of one workflow run
pub fn record_workflow(result: &VoiceWorkflowResult) {
    let timings = &result.timings;
    let stages = [
        ("transcription", timings.transcription_ms),
        ("forward_translation", timings.forward_translation_ms),
        ("answer", timings.answer_ms),
        ("reverse_translation", timings.reverse_translation_ms),
        ("synthesis", timings.synthesis_ms),
    ];
    for (stage, ms) in stages {
        if ms > 0 {
            metrics::histogram!("agri_voice_stage_latency_ms", "stage" => stage).record(ms as f64);
        }
    }
    metrics::histogram!("agri_voice_workflow_latency_ms").record(timings.total_ms as f64);

    let outcome = match result.stage {
        WorkflowStage::Done if result.warnings.is_empty() => "complete",
        WorkflowStage::Done => "degraded",
        WorkflowStage::TranscriptionFailed => "transcription_failed",
        _ => "incomplete",
    };
    metrics::counter!("agri_voice_workflows_total", "outcome" => outcome).increment(1);

    for warning in &result.warnings {
        metrics::counter!("agri_voice_workflow_warnings_total", "kind" => warning.as_str())
            .increment(1);
    }
}
