//! Translation and text-language detection
//!
//! Questions are answered in English, so every non-English query is translated
//! on the way in and the answer on the way out:
//! - [`SarvamTranslator`]: one request against the hosted endpoint
//! - [`TranslationClient`]: limits, retries, echo check, chunked fan-out
//! - [`ScriptDetector`]: Unicode-block heuristic for typed text

mod client;
mod detect;
mod http;

pub use client::TranslationClient;
pub use detect::{detect_text_language, ScriptDetector, TextLanguageBasis, SCRIPT_PRIORITY};
pub use http::SarvamTranslator;
