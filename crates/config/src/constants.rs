//! Centralized constants for the voice pipeline
//!
//! Defaults for every tunable in [`crate::Settings`]. Code that needs one of
//! these values should read it from settings; the constants exist so the
//! serde defaults and the tests agree on a single number.

/// Service endpoints
pub mod endpoints {
    /// Hosted speech/translation API
    pub const SPEECH_API_DEFAULT: &str = "https://api.sarvam.ai";

    pub const SPEECH_TO_TEXT_PATH: &str = "/speech-to-text";
    pub const TRANSLATE_PATH: &str = "/translate";
    pub const TEXT_TO_SPEECH_PATH: &str = "/text-to-speech";

    /// Retrieval + generation service
    pub const ANSWER_SERVICE_DEFAULT: &str = "http://127.0.0.1:8600/api/answer";
}

/// Speech-to-text and language detection
pub mod stt {
    pub const DEFAULT_MODEL: &str = "saarika:v2";

    /// Clips smaller than this are treated as a failed recording
    pub const MIN_AUDIO_BYTES: usize = 1000;

    /// A detection transcript must be longer than this to count
    pub const MIN_DETECTION_TRANSCRIPT_CHARS: usize = 5;

    /// Fast-path candidates, tried in this order
    pub const FAST_PATH_LANGUAGES: &[&str] = &["hi-IN", "en-IN", "ta-IN", "ml-IN", "te-IN"];
}

/// Text translation
pub mod translation {
    /// Hard per-request input limit of the endpoint
    pub const CALL_CHAR_LIMIT: usize = 1000;

    /// Margin kept below the hard limit
    pub const SAFETY_BUFFER_CHARS: usize = 100;

    pub const PRIMARY_MODE: &str = "formal";
    pub const ALTERNATE_MODE: &str = "modern-colloquial";

    pub const MAX_RETRIES: u32 = 2;
    pub const RETRY_BACKOFF_MS: u64 = 300;
    pub const MAX_CONCURRENT_CHUNKS: usize = 5;
}

/// Text-to-speech
pub mod tts {
    pub const DEFAULT_MODEL: &str = "bulbul:v2";
    pub const DEFAULT_SPEAKER: &str = "anushka";
    pub const DEFAULT_PACE: f32 = 1.0;
    pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

    /// Text beyond this is cut at a sentence boundary
    pub const MAX_TEXT_CHARS: usize = 2000;

    /// Text at or below this goes out in one request
    pub const CHUNK_THRESHOLD_CHARS: usize = 500;
    pub const MAX_CHUNK_CHARS: usize = 500;

    pub const MAX_RETRIES: u32 = 2;
    pub const RETRY_BACKOFF_MS: u64 = 500;
    pub const MAX_CONCURRENT_CHUNKS: usize = 5;
}

/// Concurrency caps
pub mod concurrency {
    /// Outbound requests in flight across all stages of one workflow
    pub const MAX_CONCURRENT_REQUESTS: usize = 8;

    /// Candidate languages transcribed at once during the detection sweep
    pub const DETECTION_SWEEP_CONCURRENCY: usize = 6;
}

/// Timeouts
pub mod timeouts {
    pub const STT_REQUEST_SECS: u64 = 60;
    pub const TRANSLATION_REQUEST_SECS: u64 = 30;
    pub const TTS_REQUEST_SECS: u64 = 60;
    pub const ANSWER_REQUEST_SECS: u64 = 90;

    /// Ceiling on the sequential detection fast path
    pub const DETECTION_FAST_PATH_SECS: u64 = 45;

    /// Ceilings on waiting for a whole worker-pool batch
    pub const DETECTION_SWEEP_BATCH_SECS: u64 = 60;
    pub const TRANSLATION_BATCH_SECS: u64 = 60;
    pub const TTS_BATCH_SECS: u64 = 120;

    /// Auth probe per candidate scheme
    pub const AUTH_PROBE_SECS: u64 = 10;

    /// Must cover the sum of the stage ceilings above
    pub const HTTP_REQUEST_SECS: u64 = 600;
}
