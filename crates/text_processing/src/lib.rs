//! Text processing for the agricultural voice pipeline
//!
//! This crate provides:
//! - **Translation**: between English and the supported Indian languages,
//!   with chunking for text over the endpoint's size limit
//! - **Text language detection**: script-block heuristic for typed queries
//!
//! # Example
//!
//! ```ignore
//! use agri_voice_text_processing::{SarvamTranslator, TranslationClient};
//!
//! let backend = Arc::new(SarvamTranslator::new(api.clone(), &settings.translation));
//! let client = TranslationClient::new(backend, pool.clone(), settings.translation.clone());
//!
//! let english = client.translate(question, Language::Hindi, Language::English).await;
//! ```

pub mod translation;

pub use translation::{
    detect_text_language, SarvamTranslator, ScriptDetector, TextLanguageBasis, TranslationClient,
};
