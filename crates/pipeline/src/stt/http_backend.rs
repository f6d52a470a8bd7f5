//! Hosted speech-to-text endpoint
//!
//! One multipart upload per call: the clip as `file` (named after its sniffed
//! format), plus `language_code` and `model`. The endpoint answers with
//! `{"transcript": "..."}`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use agri_voice_config::constants::endpoints;
use agri_voice_config::SttConfig;
use agri_voice_core::{AudioClip, Error, Language, Result, SpeechToText};
use agri_voice_transport::ApiClient;

use crate::PipelineError;

/// Response from the speech-to-text endpoint
#[derive(Debug, Deserialize)]
struct SttResponse {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    language_code: Option<String>,
}

/// Speech-to-text backed by the speech API
pub struct SarvamStt {
    api: ApiClient,
    model: String,
    timeout: Duration,
}

impl SarvamStt {
    pub fn new(api: ApiClient, config: &SttConfig) -> Self {
        Self {
            api,
            model: config.model.clone(),
            timeout: config.timeout(),
        }
    }

    fn form(&self, audio: &AudioClip, language: Language) -> std::result::Result<Form, PipelineError> {
        let part = Part::bytes(audio.bytes().to_vec())
            .file_name(audio.file_name())
            .mime_str(audio.mime_type())
            .map_err(|e| PipelineError::Audio(format!("Invalid audio MIME type: {}", e)))?;

        Ok(Form::new()
            .part("file", part)
            .text("language_code", language.api_code())
            .text("model", self.model.clone()))
    }
}

#[async_trait]
impl SpeechToText for SarvamStt {
    async fn transcribe(&self, audio: &AudioClip, language: Language) -> Result<String> {
        let start = Instant::now();
        let form = self.form(audio, language)?;

        let response: SttResponse = self
            .api
            .post_multipart(endpoints::SPEECH_TO_TEXT_PATH, form, self.timeout)
            .await
            .map_err(Error::from)?;

        tracing::debug!(
            language = %language,
            reported = ?response.language_code,
            chars = response.transcript.chars().count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Speech-to-text response"
        );

        Ok(response.transcript.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
