//! Result-with-status values returned by the pipeline clients
//!
//! None of these carry an error. A failed stage reports `success = false`
//! together with a safe default the caller can still display.

use crate::Language;
use serde::{Deserialize, Serialize};

/// Outcome of one transcription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Recognized text; empty when `success` is false
    pub text: String,
    /// Hint, detected language or the English default
    pub language: Language,
    pub success: bool,
    /// False when the language came from the fallback default rather than detection
    pub language_confident: bool,
}

impl TranscriptionResult {
    pub fn recognized(text: impl Into<String>, language: Language, language_confident: bool) -> Self {
        Self {
            text: text.into(),
            language,
            success: true,
            language_confident,
        }
    }

    pub fn failed(language: Language, language_confident: bool) -> Self {
        Self {
            text: String::new(),
            language,
            success: false,
            language_confident,
        }
    }
}

/// Outcome of one translation
///
/// When `success` is false, `text` is the untouched input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
    pub success: bool,
    /// Chunks dispatched (1 for the single-call path, 0 for a no-op)
    pub chunks_total: usize,
    /// Chunks whose original text was kept because translation failed
    pub chunks_failed: usize,
}

impl TranslationResult {
    /// Same-language or empty input, returned as-is
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
            chunks_total: 0,
            chunks_failed: 0,
        }
    }

    pub fn translated(text: impl Into<String>, chunks_total: usize, chunks_failed: usize) -> Self {
        Self {
            text: text.into(),
            success: true,
            chunks_total,
            chunks_failed,
        }
    }

    pub fn failed(original: impl Into<String>, chunks_total: usize) -> Self {
        Self {
            text: original.into(),
            success: false,
            chunks_total,
            chunks_failed: chunks_total,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.success && self.chunks_failed > 0
    }
}

/// Outcome of one synthesis
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SynthesisResult {
    /// WAV bytes; empty when `success` is false
    pub audio: Vec<u8>,
    pub success: bool,
    pub chunks_total: usize,
    pub chunks_failed: usize,
    /// Input was cut at a sentence boundary before synthesis
    pub truncated: bool,
}

impl SynthesisResult {
    pub fn failed(chunks_total: usize, truncated: bool) -> Self {
        Self {
            audio: Vec::new(),
            success: false,
            chunks_total,
            chunks_failed: chunks_total,
            truncated,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.success && self.chunks_failed > 0
    }
}
