//! Speech processing traits

use crate::{AudioClip, Language, Result};
use async_trait::async_trait;

/// Speech-to-Text backend
///
/// One call is one outbound request tagged with one language. Retrying and
/// language detection live in the clients built on top of this.
///
/// Implementations:
/// - `SarvamStt` - hosted multilingual STT over HTTP
///
/// # Example
///
/// ```ignore
/// let stt: Arc<dyn SpeechToText> = Arc::new(SarvamStt::new(api, stt_config));
/// let transcript = stt.transcribe(&clip, Language::Hindi).await?;
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Transcribe a clip assuming it is spoken in `language`
    ///
    /// An empty transcript is returned as `Ok("")`; callers decide whether
    /// that counts as failure.
    async fn transcribe(&self, audio: &AudioClip, language: Language) -> Result<String>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

/// Text-to-Speech backend
///
/// Implementations:
/// - `SarvamTts` - hosted multilingual TTS returning WAV
#[async_trait]
pub trait TextToSpeech: Send + Sync + 'static {
    /// Synthesize `text` spoken in `language`, returning one WAV container
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
