//! Speech-to-text
//!
//! [`SarvamStt`] is the raw backend; [`TranscriptionClient`] adds the input
//! gate and language detection on top of it.

mod client;
mod detector;
mod http_backend;

pub use client::TranscriptionClient;
pub use detector::{DetectionMethod, LanguageDetection, LanguageDetector};
pub use http_backend::SarvamStt;
