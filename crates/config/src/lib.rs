//! Configuration management for the agricultural voice pipeline
//!
//! Supports loading configuration from:
//! - TOML/YAML/JSON files under `config/`
//! - Environment variables (`AGRI_VOICE__` prefix, `__` section separator)
//!
//! Every section has defaults, so an empty configuration is valid. A missing
//! speech API key only disables the voice features.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, AnswerConfig, AuthScheme, ObservabilityConfig, RuntimeEnvironment,
    ServerConfig, Settings, SpeechApiConfig, SttConfig, TranslationConfig, TtsConfig,
    WorkflowConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => ConfigError::MissingField(key),
            config::ConfigError::Foreign(e) => ConfigError::Environment(e.to_string()),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}

impl From<ConfigError> for agri_voice_core::Error {
    fn from(err: ConfigError) -> Self {
        agri_voice_core::Error::Configuration(err.to_string())
    }
}
