//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use agri_voice_core::{Language, TranslationMode};

use crate::constants::{concurrency, endpoints, stt, timeouts, translation, tts};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Hosted speech/translation API connection
    #[serde(default)]
    pub speech_api: SpeechApiConfig,

    #[serde(default)]
    pub stt: SttConfig,

    #[serde(default)]
    pub translation: TranslationConfig,

    #[serde(default)]
    pub tts: TtsConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Retrieval + generation service
    #[serde(default)]
    pub answer: AnswerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_speech_api()?;
        self.validate_stt()?;
        self.validate_translation()?;
        self.validate_tts()?;
        self.validate_workflow()?;
        Ok(())
    }

    /// Longest a voice query can take when every stage runs to its ceiling
    ///
    /// Detection (fast path then sweep), transcription, both translations,
    /// the answer call and synthesis run one after another.
    pub fn workflow_ceiling(&self) -> Duration {
        self.stt.fast_path_timeout()
            + self.stt.sweep_batch_timeout()
            + self.stt.timeout()
            + self.translation.batch_timeout() * 2
            + self.answer.timeout()
            + self.tts.batch_timeout()
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "Port cannot be 0"));
        }
        let ceiling = self.workflow_ceiling().as_secs();
        if self.server.timeout_seconds < ceiling {
            return Err(invalid(
                "server.timeout_seconds",
                format!(
                    "Request timeout ({}s) is shorter than the workflow's stage ceilings ({}s)",
                    self.server.timeout_seconds, ceiling
                ),
            ));
        }
        Ok(())
    }

    fn validate_speech_api(&self) -> Result<(), ConfigError> {
        let url = self.speech_api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid(
                "speech_api.base_url",
                format!("Must be an http(s) URL, got '{}'", url),
            ));
        }
        if self.speech_api.auth_schemes.is_empty() {
            return Err(invalid(
                "speech_api.auth_schemes",
                "At least one authentication scheme is required",
            ));
        }
        Ok(())
    }

    fn validate_stt(&self) -> Result<(), ConfigError> {
        if self.stt.fast_path.is_empty() {
            return Err(invalid("stt.fast_path", "Fast-path language list cannot be empty"));
        }
        if let Some(code) = self
            .stt
            .fast_path
            .iter()
            .find(|c| Language::from_code_loose(c).is_none())
        {
            return Err(invalid(
                "stt.fast_path",
                format!("Unknown language code '{}'", code),
            ));
        }
        if self.stt.sweep_concurrency == 0 {
            return Err(invalid("stt.sweep_concurrency", "Must be at least 1"));
        }
        Ok(())
    }

    fn validate_translation(&self) -> Result<(), ConfigError> {
        let t = &self.translation;
        if t.safety_buffer_chars >= t.call_char_limit {
            return Err(invalid(
                "translation.safety_buffer_chars",
                format!(
                    "Buffer ({}) must be smaller than the call limit ({})",
                    t.safety_buffer_chars, t.call_char_limit
                ),
            ));
        }
        if t.max_concurrent_chunks == 0 {
            return Err(invalid("translation.max_concurrent_chunks", "Must be at least 1"));
        }
        Ok(())
    }

    fn validate_tts(&self) -> Result<(), ConfigError> {
        let t = &self.tts;
        if t.max_chunk_chars == 0 {
            return Err(invalid("tts.max_chunk_chars", "Must be at least 1"));
        }
        if t.max_chunk_chars > t.max_text_chars {
            return Err(invalid(
                "tts.max_chunk_chars",
                format!(
                    "Chunk size ({}) exceeds the text ceiling ({})",
                    t.max_chunk_chars, t.max_text_chars
                ),
            ));
        }
        if t.max_concurrent_chunks == 0 {
            return Err(invalid("tts.max_concurrent_chunks", "Must be at least 1"));
        }
        if !(0.3..=3.0).contains(&t.pace) {
            return Err(invalid(
                "tts.pace",
                format!("Must be between 0.3 and 3.0, got {}", t.pace),
            ));
        }
        Ok(())
    }

    fn validate_workflow(&self) -> Result<(), ConfigError> {
        if self.workflow.max_concurrent_requests == 0 {
            return Err(invalid("workflow.max_concurrent_requests", "Must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,

    /// Largest accepted request body (base64 audio included)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    timeouts::HTTP_REQUEST_SECS
}
fn default_max_body_bytes() -> usize {
    25 * 1024 * 1024
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Authentication header layouts accepted by the speech API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `api-subscription-key: <key>`
    SubscriptionKey,
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>`
    ApiKey,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::SubscriptionKey => "subscription_key",
            AuthScheme::Bearer => "bearer",
            AuthScheme::ApiKey => "api_key",
        }
    }
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speech API connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechApiConfig {
    #[serde(default = "default_speech_api_url")]
    pub base_url: String,

    /// Falls back to the `SARVAM_API_KEY` environment variable
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Schemes probed at startup, in order
    #[serde(default = "default_auth_schemes")]
    pub auth_schemes: Vec<AuthScheme>,

    /// Probe the schemes with a live request; when false the first one is used
    #[serde(default = "default_true")]
    pub probe_on_startup: bool,

    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_speech_api_url() -> String {
    endpoints::SPEECH_API_DEFAULT.to_string()
}
fn default_api_key() -> Option<String> {
    std::env::var("SARVAM_API_KEY").ok().filter(|k| !k.trim().is_empty())
}
fn default_auth_schemes() -> Vec<AuthScheme> {
    vec![AuthScheme::SubscriptionKey, AuthScheme::Bearer, AuthScheme::ApiKey]
}
fn default_probe_timeout() -> u64 {
    timeouts::AUTH_PROBE_SECS
}

impl Default for SpeechApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_api_url(),
            api_key: default_api_key(),
            auth_schemes: default_auth_schemes(),
            probe_on_startup: true,
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl SpeechApiConfig {
    /// Key with surrounding whitespace removed, if one is configured
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Speech-to-text and spoken-language detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    #[serde(default = "default_stt_model")]
    pub model: String,

    #[serde(default = "default_stt_timeout")]
    pub timeout_secs: u64,

    /// Clips below this size are rejected without a request
    #[serde(default = "default_min_audio_bytes")]
    pub min_audio_bytes: usize,

    /// Detection fast-path candidates (API codes), tried in order
    #[serde(default = "default_fast_path")]
    pub fast_path: Vec<String>,

    /// A detection transcript must be longer than this many characters
    #[serde(default = "default_min_detection_chars")]
    pub min_detection_chars: usize,

    /// Candidates transcribed at once during the sweep
    #[serde(default = "default_sweep_concurrency")]
    pub sweep_concurrency: usize,

    /// Ceiling on the whole sequential fast-path phase
    #[serde(default = "default_fast_path_timeout")]
    pub fast_path_timeout_secs: u64,

    #[serde(default = "default_sweep_batch_timeout")]
    pub sweep_batch_timeout_secs: u64,
}

fn default_stt_model() -> String {
    stt::DEFAULT_MODEL.to_string()
}
fn default_stt_timeout() -> u64 {
    timeouts::STT_REQUEST_SECS
}
fn default_min_audio_bytes() -> usize {
    stt::MIN_AUDIO_BYTES
}
fn default_fast_path() -> Vec<String> {
    stt::FAST_PATH_LANGUAGES.iter().map(|s| s.to_string()).collect()
}
fn default_min_detection_chars() -> usize {
    stt::MIN_DETECTION_TRANSCRIPT_CHARS
}
fn default_sweep_concurrency() -> usize {
    concurrency::DETECTION_SWEEP_CONCURRENCY
}
fn default_fast_path_timeout() -> u64 {
    timeouts::DETECTION_FAST_PATH_SECS
}
fn default_sweep_batch_timeout() -> u64 {
    timeouts::DETECTION_SWEEP_BATCH_SECS
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: default_stt_model(),
            timeout_secs: default_stt_timeout(),
            min_audio_bytes: default_min_audio_bytes(),
            fast_path: default_fast_path(),
            min_detection_chars: default_min_detection_chars(),
            sweep_concurrency: default_sweep_concurrency(),
            fast_path_timeout_secs: default_fast_path_timeout(),
            sweep_batch_timeout_secs: default_sweep_batch_timeout(),
        }
    }
}

impl SttConfig {
    /// Fast-path list resolved to languages, unknown codes dropped
    pub fn fast_path_languages(&self) -> Vec<Language> {
        let mut out = Vec::with_capacity(self.fast_path.len());
        for code in &self.fast_path {
            match Language::from_code_loose(code) {
                Some(lang) if !out.contains(&lang) => out.push(lang),
                Some(_) => {}
                None => tracing::warn!(code = %code, "Ignoring unknown fast-path language"),
            }
        }
        out
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn fast_path_timeout(&self) -> Duration {
        Duration::from_secs(self.fast_path_timeout_secs)
    }

    pub fn sweep_batch_timeout(&self) -> Duration {
        Duration::from_secs(self.sweep_batch_timeout_secs)
    }
}

/// Text translation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Endpoint's per-request character limit
    #[serde(default = "default_call_char_limit")]
    pub call_char_limit: usize,

    /// Margin kept below the limit; the single-call path takes up to `limit - buffer`
    #[serde(default = "default_safety_buffer")]
    pub safety_buffer_chars: usize,

    #[serde(default = "default_translation_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_primary_mode")]
    pub primary_mode: TranslationMode,

    /// Mode used for the single retry when the backend echoes its input
    #[serde(default = "default_alternate_mode")]
    pub alternate_mode: TranslationMode,

    #[serde(default = "default_translation_retries")]
    pub max_retries: u32,

    #[serde(default = "default_translation_backoff")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_translation_concurrency")]
    pub max_concurrent_chunks: usize,

    #[serde(default = "default_translation_batch_timeout")]
    pub batch_timeout_secs: u64,

    /// Ask the endpoint to normalise input before translating
    #[serde(default)]
    pub enable_preprocessing: bool,
}

fn default_call_char_limit() -> usize {
    translation::CALL_CHAR_LIMIT
}
fn default_safety_buffer() -> usize {
    translation::SAFETY_BUFFER_CHARS
}
fn default_translation_timeout() -> u64 {
    timeouts::TRANSLATION_REQUEST_SECS
}
fn default_primary_mode() -> TranslationMode {
    TranslationMode::Formal
}
fn default_alternate_mode() -> TranslationMode {
    TranslationMode::ModernColloquial
}
fn default_translation_retries() -> u32 {
    translation::MAX_RETRIES
}
fn default_translation_backoff() -> u64 {
    translation::RETRY_BACKOFF_MS
}
fn default_translation_concurrency() -> usize {
    translation::MAX_CONCURRENT_CHUNKS
}
fn default_translation_batch_timeout() -> u64 {
    timeouts::TRANSLATION_BATCH_SECS
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            call_char_limit: default_call_char_limit(),
            safety_buffer_chars: default_safety_buffer(),
            timeout_secs: default_translation_timeout(),
            primary_mode: default_primary_mode(),
            alternate_mode: default_alternate_mode(),
            max_retries: default_translation_retries(),
            retry_backoff_ms: default_translation_backoff(),
            max_concurrent_chunks: default_translation_concurrency(),
            batch_timeout_secs: default_translation_batch_timeout(),
            enable_preprocessing: false,
        }
    }
}

impl TranslationConfig {
    /// Longest text sent in one request
    pub fn safe_chars(&self) -> usize {
        self.call_char_limit.saturating_sub(self.safety_buffer_chars).max(1)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }
}

/// Text-to-speech
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(default = "default_tts_model")]
    pub model: String,

    #[serde(default = "default_speaker")]
    pub speaker: String,

    #[serde(default = "default_pace")]
    pub pace: f32,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// Longer input is cut at a sentence boundary first
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Text at or below this length is synthesized in one request
    #[serde(default = "default_chunk_threshold")]
    pub chunk_threshold_chars: usize,

    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    #[serde(default = "default_tts_retries")]
    pub max_retries: u32,

    #[serde(default = "default_tts_backoff")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_tts_concurrency")]
    pub max_concurrent_chunks: usize,

    #[serde(default = "default_tts_batch_timeout")]
    pub batch_timeout_secs: u64,
}

fn default_tts_model() -> String {
    tts::DEFAULT_MODEL.to_string()
}
fn default_speaker() -> String {
    tts::DEFAULT_SPEAKER.to_string()
}
fn default_pace() -> f32 {
    tts::DEFAULT_PACE
}
fn default_sample_rate() -> u32 {
    tts::DEFAULT_SAMPLE_RATE
}
fn default_tts_timeout() -> u64 {
    timeouts::TTS_REQUEST_SECS
}
fn default_max_text_chars() -> usize {
    tts::MAX_TEXT_CHARS
}
fn default_chunk_threshold() -> usize {
    tts::CHUNK_THRESHOLD_CHARS
}
fn default_max_chunk_chars() -> usize {
    tts::MAX_CHUNK_CHARS
}
fn default_tts_retries() -> u32 {
    tts::MAX_RETRIES
}
fn default_tts_backoff() -> u64 {
    tts::RETRY_BACKOFF_MS
}
fn default_tts_concurrency() -> usize {
    tts::MAX_CONCURRENT_CHUNKS
}
fn default_tts_batch_timeout() -> u64 {
    timeouts::TTS_BATCH_SECS
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            model: default_tts_model(),
            speaker: default_speaker(),
            pace: default_pace(),
            sample_rate: default_sample_rate(),
            timeout_secs: default_tts_timeout(),
            max_text_chars: default_max_text_chars(),
            chunk_threshold_chars: default_chunk_threshold(),
            max_chunk_chars: default_max_chunk_chars(),
            max_retries: default_tts_retries(),
            retry_backoff_ms: default_tts_backoff(),
            max_concurrent_chunks: default_tts_concurrency(),
            batch_timeout_secs: default_tts_batch_timeout(),
        }
    }
}

impl TtsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }
}

/// Workflow-wide behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Outbound requests in flight across detection, translation and synthesis
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Synthesize spoken answers unless the request opts out
    #[serde(default = "default_true")]
    pub synthesize_answers: bool,
}

fn default_max_concurrent_requests() -> usize {
    concurrency::MAX_CONCURRENT_REQUESTS
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent_requests(),
            synthesize_answers: true,
        }
    }
}

/// Retrieval + generation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerConfig {
    #[serde(default = "default_answer_url")]
    pub url: String,

    #[serde(default = "default_answer_timeout")]
    pub timeout_secs: u64,
}

fn default_answer_url() -> String {
    endpoints::ANSWER_SERVICE_DEFAULT.to_string()
}
fn default_answer_timeout() -> u64 {
    timeouts::ANSWER_REQUEST_SECS
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            url: default_answer_url(),
            timeout_secs: default_answer_timeout(),
        }
    }
}

impl AnswerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Sources, later ones winning: `config/default.*`, `config/{env}.*`, then
/// `AGRI_VOICE__SECTION__FIELD` environment variables.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("AGRI_VOICE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
