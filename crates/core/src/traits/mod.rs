//! Core traits for the voice pipeline
//!
//! Every outbound capability sits behind one of these so the clients can be
//! exercised with test doubles.
//!
//! ```text
//! Speech:
//!   - SpeechToText: audio clip + language → transcript
//!   - TextToSpeech: text + language → WAV bytes
//!
//! Text processing:
//!   - Translator: one translation request in a given mode
//!
//! Knowledge:
//!   - AnswerGenerator: English question → answer + supporting passages
//! ```

mod answer;
mod speech;
mod text_processing;

pub use answer::{Answer, AnswerGenerator, Passage};
pub use speech::{SpeechToText, TextToSpeech};
pub use text_processing::{TranslationMode, Translator};
