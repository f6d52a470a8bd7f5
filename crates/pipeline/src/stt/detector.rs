//! Spoken-language detection
//!
//! The speech endpoint has no detect call, so detection means transcribing the
//! clip as language X and judging whether the transcript looks plausible.
//! Transcript length is the only signal available.
//!
//! 1. Fast path: the configured priority languages are tried one at a time;
//!    the first transcript longer than `min_detection_chars` wins. The whole
//!    phase is capped by `fast_path_timeout_secs`; once that passes the
//!    detector moves on to the sweep.
//! 2. Sweep: every remaining language is tried concurrently through the
//!    shared pool and the longest transcript wins.
//! 3. Nothing transcribed: English, flagged as a low-confidence default.
//!
//! Candidates are never retried; a failed attempt just means "not this one".

use std::sync::Arc;
use std::time::{Duration, Instant};

use agri_voice_config::SttConfig;
use agri_voice_core::{AudioClip, Language, SpeechToText};
use agri_voice_transport::WorkerPool;

/// How a language was settled on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    FastPath,
    Sweep,
    /// No candidate produced a transcript
    Default,
}

/// Detected language with how it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDetection {
    pub language: Language,
    pub method: DetectionMethod,
    /// Characters in the winning transcript
    pub transcript_chars: usize,
    /// Transcription attempts made
    pub attempts: usize,
}

impl LanguageDetection {
    pub fn is_confident(&self) -> bool {
        self.method != DetectionMethod::Default
    }
}

/// Two-phase spoken-language detector
pub struct LanguageDetector {
    stt: Arc<dyn SpeechToText>,
    pool: WorkerPool,
    fast_path: Vec<Language>,
    min_chars: usize,
    fast_path_timeout: Duration,
    sweep_concurrency: usize,
    sweep_timeout: Duration,
}

impl LanguageDetector {
    pub fn new(stt: Arc<dyn SpeechToText>, pool: WorkerPool, config: &SttConfig) -> Self {
        Self {
            stt,
            pool,
            fast_path: config.fast_path_languages(),
            min_chars: config.min_detection_chars,
            fast_path_timeout: config.fast_path_timeout(),
            sweep_concurrency: config.sweep_concurrency,
            sweep_timeout: config.sweep_batch_timeout(),
        }
    }

    pub fn fast_path(&self) -> &[Language] {
        &self.fast_path
    }

    /// Detect the language spoken in `clip`; English when nothing matches
    pub async fn detect_spoken_language(&self, clip: &AudioClip) -> Language {
        self.detect(clip).await.language
    }

    /// Detect the language spoken in `clip`, reporting how it was decided
    pub async fn detect(&self, clip: &AudioClip) -> LanguageDetection {
        let start = Instant::now();
        let mut attempts = 0usize;
        let deadline = tokio::time::Instant::now() + self.fast_path_timeout;

        for &language in &self.fast_path {
            attempts += 1;
            let call = self.pool.run(self.stt.transcribe(clip, language));
            let Ok(outcome) = tokio::time::timeout_at(deadline, call).await else {
                tracing::warn!(
                    language = %language,
                    attempts,
                    timeout_secs = self.fast_path_timeout.as_secs(),
                    "Fast path ran out of time, moving on to the sweep"
                );
                break;
            };
            match outcome {
                Ok(transcript) => {
                    let chars = transcript.chars().count();
                    if chars > self.min_chars {
                        tracing::info!(
                            language = %language,
                            chars,
                            attempts,
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "Language detected on fast path"
                        );
                        return LanguageDetection {
                            language,
                            method: DetectionMethod::FastPath,
                            transcript_chars: chars,
                            attempts,
                        };
                    }
                    tracing::debug!(language = %language, chars, "Fast-path transcript too short");
                }
                Err(e) => {
                    tracing::debug!(language = %language, error = %e, "Fast-path candidate failed");
                }
            }
        }

        let remaining: Vec<Language> = Language::all()
            .iter()
            .copied()
            .filter(|lang| !self.fast_path.contains(lang))
            .collect();
        attempts += remaining.len();

        let stt = &self.stt;
        let slots = self
            .pool
            .run_indexed(
                remaining.clone(),
                self.sweep_concurrency,
                self.sweep_timeout,
                move |_, language: Language| async move { stt.transcribe(clip, language).await },
            )
            .await;

        let mut best: Option<(Language, usize)> = None;
        for (language, slot) in remaining.iter().zip(slots) {
            let chars = match slot {
                Some(Ok(transcript)) => transcript.chars().count(),
                Some(Err(e)) => {
                    tracing::debug!(language = %language, error = %e, "Sweep candidate failed");
                    continue;
                }
                None => continue,
            };
            if chars > 0 && best.map_or(true, |(_, top)| chars > top) {
                best = Some((*language, chars));
            }
        }

        match best {
            Some((language, chars)) => {
                tracing::info!(
                    language = %language,
                    chars,
                    attempts,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Language detected by sweep"
                );
                LanguageDetection {
                    language,
                    method: DetectionMethod::Sweep,
                    transcript_chars: chars,
                    attempts,
                }
            }
            None => {
                tracing::warn!(
                    attempts,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "No candidate language produced a transcript, defaulting to English"
                );
                LanguageDetection {
                    language: Language::English,
                    method: DetectionMethod::Default,
                    transcript_chars: 0,
                    attempts,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedStt;
    use agri_voice_core::Error;

    fn config() -> SttConfig {
        SttConfig {
            fast_path: vec!["hi".into(), "en".into(), "ta".into()],
            min_detection_chars: 5,
            sweep_concurrency: 4,
            ..SttConfig::default()
        }
    }

    fn clip() -> AudioClip {
        AudioClip::new(vec![0u8; 4000])
    }

    /// Hangs on Hindi, answers Bengali, rejects everything else
    struct StalledHindiStt;

    #[async_trait::async_trait]
    impl SpeechToText for StalledHindiStt {
        async fn transcribe(
            &self,
            _audio: &AudioClip,
            language: Language,
        ) -> agri_voice_core::Result<String> {
            match language {
                Language::Hindi => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("too late".into())
                }
                Language::Bengali => Ok("ধানের জন্য কোন সার".into()),
                _ => Err(Error::Endpoint {
                    status: 400,
                    body: "unsupported".into(),
                }),
            }
        }

        fn model_name(&self) -> &str {
            "stalled-stt"
        }
    }

    #[tokio::test]
    async fn test_fast_path_stops_at_first_plausible_language() {
        let stt = ScriptedStt::new(|lang| match lang {
            Language::Hindi => Ok("ok".into()),
            Language::English => Ok("how much urea for wheat".into()),
            _ => Ok("should not be asked".into()),
        });
        let detector = LanguageDetector::new(stt.clone(), WorkerPool::new(4), &config());

        let detection = detector.detect(&clip()).await;
        assert_eq!(detection.language, Language::English);
        assert_eq!(detection.method, DetectionMethod::FastPath);
        assert_eq!(stt.calls(), 2);
        assert_eq!(stt.languages(), vec![Language::Hindi, Language::English]);
    }

    #[tokio::test]
    async fn test_sweep_picks_longest_transcript() {
        let stt = ScriptedStt::new(|lang| match lang {
            Language::Bengali => Ok("ধানের জন্য সার".into()),
            Language::Marathi => Ok("भातासाठी कोणते खत वापरावे".into()),
            Language::Hindi | Language::English | Language::Tamil => Ok(String::new()),
            _ => Err(Error::Endpoint {
                status: 400,
                body: "unsupported".into(),
            }),
        });
        let detector = LanguageDetector::new(stt.clone(), WorkerPool::new(4), &config());

        let detection = detector.detect(&clip()).await;
        assert_eq!(detection.language, Language::Marathi);
        assert_eq!(detection.method, DetectionMethod::Sweep);
        assert_eq!(stt.calls(), Language::all().len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_fast_path_falls_through_to_sweep() {
        let config = SttConfig {
            fast_path_timeout_secs: 5,
            ..config()
        };
        let detector = LanguageDetector::new(Arc::new(StalledHindiStt), WorkerPool::new(4), &config);

        let started = tokio::time::Instant::now();
        let detection = detector.detect(&clip()).await;

        assert_eq!(detection.language, Language::Bengali);
        assert_eq!(detection.method, DetectionMethod::Sweep);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_all_candidates_failing_defaults_to_english() {
        let stt = ScriptedStt::new(|_| Err(Error::Network("connection reset".into())));
        let detector = LanguageDetector::new(stt.clone(), WorkerPool::new(4), &config());

        let detection = detector.detect(&clip()).await;
        assert_eq!(detection.language, Language::English);
        assert_eq!(detection.method, DetectionMethod::Default);
        assert!(!detection.is_confident());
        // One attempt per language, no retries
        assert_eq!(stt.calls(), Language::all().len());
        assert_eq!(detector.detect_spoken_language(&clip()).await, Language::English);
    }
}
