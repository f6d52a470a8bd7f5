//! Voice pipeline
//!
//! Turns a spoken (or typed) farmer question into a spoken answer:
//! - [`stt`]: transcription and spoken-language detection
//! - [`tts`]: chunked synthesis and WAV concatenation
//! - [`orchestrator`]: the end-to-end voice query workflow

pub mod orchestrator;
pub mod stt;
pub mod tts;

#[cfg(test)]
mod test_support;

pub use orchestrator::{
    answer_text_only, StageTimings, VoiceWorkflow, VoiceWorkflowResult, WorkflowStage,
    WorkflowWarning, ANSWER_APOLOGY,
};
pub use stt::{
    DetectionMethod, LanguageDetection, LanguageDetector, SarvamStt, TranscriptionClient,
};
pub use tts::{concat_wav, SarvamTts, SpeechSynthesizer, WavError};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Audio error: {0}")]
    Audio(String),

    #[error("WAV error: {0}")]
    Wav(#[from] WavError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<PipelineError> for agri_voice_core::Error {
    fn from(err: PipelineError) -> Self {
        use agri_voice_core::Error;
        match err {
            PipelineError::Audio(msg) => Error::Audio(msg),
            PipelineError::Wav(e) => Error::Audio(e.to_string()),
            PipelineError::InvalidResponse(msg) => Error::InvalidResponse(msg),
        }
    }
}
