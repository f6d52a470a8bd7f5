//! Transcription with an input gate and optional language detection

use std::sync::Arc;
use std::time::{Duration, Instant};

use agri_voice_config::SttConfig;
use agri_voice_core::{AudioClip, Error, Language, SpeechToText, TranscriptionResult};
use agri_voice_transport::WorkerPool;

use super::detector::LanguageDetector;

/// Longest transcript prefix written to logs
const LOG_PREVIEW_CHARS: usize = 100;

/// Transcription client
///
/// [`TranscriptionClient::transcribe`] never fails. Short clips are rejected
/// without a request; endpoint errors and empty transcripts come back as
/// `success = false` with the hint (or the detected/default language) still set.
pub struct TranscriptionClient {
    stt: Arc<dyn SpeechToText>,
    pool: WorkerPool,
    detector: LanguageDetector,
    min_audio_bytes: usize,
    timeout: Duration,
}

impl TranscriptionClient {
    pub fn new(stt: Arc<dyn SpeechToText>, pool: WorkerPool, config: &SttConfig) -> Self {
        let detector = LanguageDetector::new(Arc::clone(&stt), pool.clone(), config);
        Self {
            stt,
            pool,
            detector,
            min_audio_bytes: config.min_audio_bytes,
            timeout: config.timeout(),
        }
    }

    pub fn detector(&self) -> &LanguageDetector {
        &self.detector
    }

    /// Transcribe `clip`, detecting its language first when no hint is given
    pub async fn transcribe(&self, clip: &AudioClip, hint: Option<Language>) -> TranscriptionResult {
        if clip.len() < self.min_audio_bytes {
            tracing::warn!(
                bytes = clip.len(),
                min_bytes = self.min_audio_bytes,
                "Audio too short, recording probably failed"
            );
            return TranscriptionResult::failed(hint.unwrap_or_default(), hint.is_some());
        }

        let (language, confident) = match hint {
            Some(language) => (language, true),
            None => {
                let detection = self.detector.detect(clip).await;
                (detection.language, detection.is_confident())
            }
        };

        let start = Instant::now();
        let call = self.pool.run(self.stt.transcribe(clip, language));
        let outcome = tokio::time::timeout(self.timeout, call).await.unwrap_or_else(|_| {
            Err(Error::Timeout(format!(
                "transcription exceeded {}s",
                self.timeout.as_secs()
            )))
        });
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                tracing::info!(
                    language = %language,
                    format = clip.extension(),
                    elapsed_ms,
                    transcript = %preview(&text),
                    "Transcribed"
                );
                TranscriptionResult::recognized(text.trim(), language, confident)
            }
            Ok(_) => {
                tracing::warn!(language = %language, elapsed_ms, "Empty transcript");
                TranscriptionResult::failed(language, confident)
            }
            Err(e) => {
                tracing::warn!(
                    language = %language,
                    elapsed_ms,
                    error = %e,
                    model = self.stt.model_name(),
                    "Transcription failed"
                );
                TranscriptionResult::failed(language, confident)
            }
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedStt;
    use agri_voice_core::Error;

    fn client(stt: Arc<ScriptedStt>) -> TranscriptionClient {
        TranscriptionClient::new(stt, WorkerPool::new(4), &SttConfig::default())
    }

    #[tokio::test]
    async fn test_short_audio_rejected_without_request() {
        let stt = ScriptedStt::new(|_| Ok("never".into()));
        let client = client(stt.clone());

        let result = client.transcribe(&AudioClip::new(vec![0u8; 500]), None).await;
        assert_eq!(result.text, "");
        assert_eq!(result.language, Language::English);
        assert!(!result.success);

        let result = client
            .transcribe(&AudioClip::new(vec![0u8; 500]), Some(Language::Tamil))
            .await;
        assert_eq!(result.language, Language::Tamil);
        assert!(!result.success);

        assert_eq!(stt.calls(), 0);
    }

    #[tokio::test]
    async fn test_hint_makes_exactly_one_request() {
        let stt = ScriptedStt::new(|_| Ok(" गेहूं में यूरिया कब डालें ".into()));
        let client = client(stt.clone());

        let result = client
            .transcribe(&AudioClip::new(vec![1u8; 2000]), Some(Language::Hindi))
            .await;
        assert!(result.success);
        assert!(result.language_confident);
        assert_eq!(result.text, "गेहूं में यूरिया कब डालें");
        assert_eq!(stt.calls(), 1);
    }

    #[tokio::test]
    async fn test_detection_then_one_transcription() {
        let stt = ScriptedStt::new(|lang| match lang {
            Language::Hindi => Ok("धान की रोपाई कब करें".into()),
            _ => Ok(String::new()),
        });
        let client = client(stt.clone());

        let result = client.transcribe(&AudioClip::new(vec![1u8; 2000]), None).await;
        assert!(result.success);
        assert_eq!(result.language, Language::Hindi);
        // Hindi is first on the fast path, then one tagged transcription
        assert_eq!(stt.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_hint() {
        let stt = ScriptedStt::new(|_| {
            Err(Error::Endpoint {
                status: 500,
                body: "boom".into(),
            })
        });
        let client = client(stt.clone());

        let result = client
            .transcribe(&AudioClip::new(vec![1u8; 2000]), Some(Language::Kannada))
            .await;
        assert!(!result.success);
        assert!(result.text.is_empty());
        assert_eq!(result.language, Language::Kannada);
        assert_eq!(stt.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_transcript_is_failure() {
        let stt = ScriptedStt::new(|_| Ok("   ".into()));
        let client = client(stt.clone());

        let result = client
            .transcribe(&AudioClip::new(vec![1u8; 2000]), Some(Language::English))
            .await;
        assert!(!result.success);
        assert_eq!(result.language, Language::English);
    }

    struct StalledStt;

    #[async_trait::async_trait]
    impl SpeechToText for StalledStt {
        async fn transcribe(
            &self,
            _audio: &AudioClip,
            _language: Language,
        ) -> agri_voice_core::Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("too late".into())
        }

        fn model_name(&self) -> &str {
            "stalled-stt"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_transcription_fails_at_timeout() {
        let config = SttConfig {
            timeout_secs: 5,
            ..SttConfig::default()
        };
        let client = TranscriptionClient::new(Arc::new(StalledStt), WorkerPool::new(4), &config);

        let started = tokio::time::Instant::now();
        let result = client
            .transcribe(&AudioClip::new(vec![1u8; 2000]), Some(Language::Telugu))
            .await;
        assert!(!result.success);
        assert_eq!(result.language, Language::Telugu);
        assert!(started.elapsed() < Duration::from_secs(60));
    }
}
