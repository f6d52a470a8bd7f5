//! Hosted text-to-speech endpoint

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use agri_voice_config::constants::endpoints;
use agri_voice_config::TtsConfig;
use agri_voice_core::{Error, Language, Result, TextToSpeech};
use agri_voice_transport::ApiClient;

use super::wav::concat_wav;
use crate::PipelineError;

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    target_language_code: &'a str,
    speaker: &'a str,
    pace: f32,
    speech_sample_rate: u32,
    model: &'a str,
    enable_preprocessing: bool,
}

#[derive(Debug, Deserialize)]
struct TtsResponse {
    #[serde(default)]
    audios: Vec<String>,
}

/// Text-to-speech backed by the speech API
///
/// One request per call. The endpoint returns base64 WAV; when it splits the
/// answer into several `audios` they are joined into one file.
pub struct SarvamTts {
    api: ApiClient,
    model: String,
    speaker: String,
    pace: f32,
    sample_rate: u32,
    timeout: Duration,
}

impl SarvamTts {
    pub fn new(api: ApiClient, config: &TtsConfig) -> Self {
        Self {
            api,
            model: config.model.clone(),
            speaker: config.speaker.clone(),
            pace: config.pace,
            sample_rate: config.sample_rate,
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl TextToSpeech for SarvamTts {
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>> {
        let start = Instant::now();
        let request = TtsRequest {
            text,
            target_language_code: language.api_code(),
            speaker: &self.speaker,
            pace: self.pace,
            speech_sample_rate: self.sample_rate,
            model: &self.model,
            enable_preprocessing: true,
        };

        let response: TtsResponse = self
            .api
            .post_json(endpoints::TEXT_TO_SPEECH_PATH, &request, self.timeout)
            .await?;

        let mut clips = Vec::with_capacity(response.audios.len());
        for encoded in &response.audios {
            let bytes = BASE64
                .decode(encoded.trim())
                .map_err(|e| PipelineError::InvalidResponse(format!("Invalid base64 audio: {}", e)))?;
            clips.push(bytes);
        }

        let audio = match clips.len() {
            0 => return Err(Error::Empty("audios".to_string())),
            1 => clips.swap_remove(0),
            _ => concat_wav(&clips).map_err(PipelineError::from)?,
        };

        tracing::debug!(
            language = %language,
            chars = text.chars().count(),
            bytes = audio.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Text-to-speech response"
        );

        Ok(audio)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
