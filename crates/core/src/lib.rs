//! Core traits and types for the agricultural voice pipeline
//!
//! This crate provides foundational types used across all other crates:
//! - Language catalog with API codes and native display names
//! - Audio clips and the magic-byte format sniffer
//! - Boundary-aware text chunking
//! - Result-with-status types for every pipeline stage
//! - Backend traits (STT, TTS, translation, answer generation)
//! - Error types

pub mod audio;
pub mod chunk;
pub mod error;
pub mod language;
pub mod results;
pub mod traits;

pub use audio::{detect_format, AudioClip, AudioFormat};
pub use chunk::{AudioChunk, ChunkConfig, SplitLevel, TextChunk, TextChunker};
pub use error::{Error, Result};
pub use language::{Language, Script};
pub use results::{SynthesisResult, TranscriptionResult, TranslationResult};
pub use traits::{
    Answer, AnswerGenerator, Passage, SpeechToText, TextToSpeech, TranslationMode, Translator,
};
