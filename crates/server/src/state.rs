//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use agri_voice_config::Settings;
use agri_voice_core::{AnswerGenerator, Result};
use agri_voice_pipeline::{SarvamStt, SarvamTts, VoiceWorkflow};
use agri_voice_text_processing::SarvamTranslator;
use agri_voice_transport::ApiClient;

use crate::answer::RemoteAnswerService;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    /// Full voice workflow; `None` when the speech API is unusable
    pub workflow: Option<Arc<VoiceWorkflow>>,
    pub answerer: Arc<dyn AnswerGenerator>,
    /// Why voice features are off, for health and error responses
    pub voice_disabled_reason: Option<String>,
}

impl AppState {
    pub fn new(
        config: Settings,
        answerer: Arc<dyn AnswerGenerator>,
        workflow: Option<Arc<VoiceWorkflow>>,
    ) -> Self {
        let voice_disabled_reason = workflow
            .is_none()
            .then(|| "speech API not configured".to_string());
        Self {
            config: Arc::new(config),
            workflow,
            answerer,
            voice_disabled_reason,
        }
    }

    /// Build state from settings, settling speech API authentication
    ///
    /// Authentication problems disable voice features instead of failing:
    /// text questions still get English answers.
    pub async fn connect(config: Settings) -> Result<Self> {
        let answerer: Arc<dyn AnswerGenerator> = Arc::new(RemoteAnswerService::new(&config.answer)?);

        let (workflow, reason) = match ApiClient::connect(&config.speech_api).await {
            Ok(api) => {
                tracing::info!(
                    base_url = %api.base_url(),
                    scheme = %api.scheme(),
                    "Speech API authentication settled"
                );
                let workflow = VoiceWorkflow::new(
                    Arc::new(SarvamStt::new(api.clone(), &config.stt)),
                    Arc::new(SarvamTranslator::new(api.clone(), &config.translation)),
                    Arc::new(SarvamTts::new(api, &config.tts)),
                    Arc::clone(&answerer),
                    &config,
                );
                (Some(Arc::new(workflow)), None)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Speech API unavailable, voice features disabled; text questions still work"
                );
                (None, Some(e.to_string()))
            }
        };

        Ok(Self {
            config: Arc::new(config),
            workflow,
            answerer,
            voice_disabled_reason: reason,
        })
    }

    pub fn voice_enabled(&self) -> bool {
        self.workflow.is_some()
    }
}
