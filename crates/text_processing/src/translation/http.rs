//! Hosted translation endpoint

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use agri_voice_config::constants::endpoints;
use agri_voice_config::TranslationConfig;
use agri_voice_core::{Error, Language, Result, TranslationMode, Translator};
use agri_voice_transport::ApiClient;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    input: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
    mode: &'a str,
    enable_preprocessing: bool,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

/// Translator backed by the speech API's `/translate` endpoint
///
/// One request per call with no retry; [`crate::TranslationClient`] adds
/// size limits, retries and the echo check.
pub struct SarvamTranslator {
    api: ApiClient,
    timeout: Duration,
    enable_preprocessing: bool,
}

impl SarvamTranslator {
    pub fn new(api: ApiClient, config: &TranslationConfig) -> Self {
        Self {
            api,
            timeout: config.timeout(),
            enable_preprocessing: config.enable_preprocessing,
        }
    }
}

#[async_trait]
impl Translator for SarvamTranslator {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
        mode: TranslationMode,
    ) -> Result<String> {
        let request = TranslateRequest {
            input: text,
            source_language_code: from.api_code(),
            target_language_code: to.api_code(),
            mode: mode.as_str(),
            enable_preprocessing: self.enable_preprocessing,
        };

        let response: TranslateResponse = self
            .api
            .post_json(endpoints::TRANSLATE_PATH, &request, self.timeout)
            .await?;

        if response.translated_text.trim().is_empty() {
            return Err(Error::Empty("translated_text".to_string()));
        }

        Ok(response.translated_text)
    }

    fn model_name(&self) -> &str {
        "sarvam-translate"
    }
}
