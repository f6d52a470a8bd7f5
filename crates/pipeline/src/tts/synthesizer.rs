//! Speech synthesis with length capping and chunked fan-out
//!
//! Long answers are first cut at a sentence boundary near `max_text_chars`.
//! Text at or below `chunk_threshold_chars` goes out as one request; anything
//! longer is split paragraph, then sentence, then clause, then word, and the
//! chunks are synthesized in parallel through the shared pool. Successful
//! chunks are joined into one WAV in their original order; a chunk that still
//! fails after its retries is left out.

use std::sync::Arc;
use std::time::Instant;

use agri_voice_config::TtsConfig;
use agri_voice_core::{
    AudioChunk, ChunkConfig, Error, Language, SplitLevel, SynthesisResult, TextChunker,
    TextToSpeech,
};
use agri_voice_transport::{RetryPolicy, WorkerPool};

use super::wav::{concat_wav, is_wav};

const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', '।', '॥'];

/// Cut `text` to at most `max_chars` characters, preferring a sentence end
///
/// Falls back to the last whitespace, then a hard cut, when no sentence ends
/// in the second half of the allowed prefix. Returns the text and whether it
/// was shortened.
pub fn truncate_for_speech(text: &str, max_chars: usize) -> (String, bool) {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return (text.to_string(), false);
    }

    let prefix: String = text.chars().take(max_chars).collect();
    let half = prefix.len() / 2;

    let sentence_end = prefix
        .char_indices()
        .filter(|(_, c)| SENTENCE_TERMINATORS.contains(c))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .filter(|&end| end >= half);

    let cut = sentence_end
        .or_else(|| prefix.rfind(char::is_whitespace).filter(|&i| i > 0))
        .unwrap_or(prefix.len());

    (prefix[..cut].trim_end().to_string(), true)
}

/// Chunked text-to-speech
///
/// [`SpeechSynthesizer::synthesize`] never fails; `success` is false only
/// when no audio at all could be produced.
pub struct SpeechSynthesizer {
    backend: Arc<dyn TextToSpeech>,
    pool: WorkerPool,
    config: TtsConfig,
    chunker: TextChunker,
    retry: RetryPolicy,
}

impl SpeechSynthesizer {
    pub fn new(backend: Arc<dyn TextToSpeech>, pool: WorkerPool, config: TtsConfig) -> Self {
        let chunker = TextChunker::new(ChunkConfig::new(config.max_chunk_chars, SplitLevel::Word));
        let retry = RetryPolicy::new(config.max_retries, config.retry_backoff());
        Self {
            backend,
            pool,
            config,
            chunker,
            retry,
        }
    }

    pub fn config(&self) -> &TtsConfig {
        &self.config
    }

    /// Synthesize `text` spoken in `language` into one WAV
    pub async fn synthesize(&self, text: &str, language: Language) -> SynthesisResult {
        let (text, truncated) = truncate_for_speech(text, self.config.max_text_chars);
        if text.is_empty() {
            tracing::warn!(language = %language, "Nothing to synthesize");
            return SynthesisResult::failed(0, truncated);
        }
        if truncated {
            tracing::info!(
                language = %language,
                max_chars = self.config.max_text_chars,
                kept_chars = text.chars().count(),
                "Answer shortened for speech"
            );
        }

        let start = Instant::now();
        let result = if text.chars().count() <= self.config.chunk_threshold_chars {
            self.synthesize_single(&text, language, truncated).await
        } else {
            self.synthesize_chunked(&text, language, truncated).await
        };

        tracing::info!(
            language = %language,
            success = result.success,
            chunks = result.chunks_total,
            failed = result.chunks_failed,
            bytes = result.audio.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Synthesis finished"
        );
        result
    }

    async fn synthesize_single(&self, text: &str, language: Language, truncated: bool) -> SynthesisResult {
        let backend = &self.backend;
        let ceiling = self.config.batch_timeout();
        let call = self
            .pool
            .run(self.retry.run("synthesize", move |_| backend.synthesize(text, language)));
        let outcome = tokio::time::timeout(ceiling, call).await.unwrap_or_else(|_| {
            Err(Error::Timeout(format!("synthesis exceeded {}s", ceiling.as_secs())))
        });

        match outcome {
            Ok(audio) if !audio.is_empty() => SynthesisResult {
                audio,
                success: true,
                chunks_total: 1,
                chunks_failed: 0,
                truncated,
            },
            Ok(_) => {
                tracing::warn!(language = %language, "Synthesis returned no audio");
                SynthesisResult::failed(1, truncated)
            }
            Err(e) => {
                tracing::warn!(
                    language = %language,
                    error = %e,
                    model = backend.model_name(),
                    "Synthesis failed"
                );
                SynthesisResult::failed(1, truncated)
            }
        }
    }

    async fn synthesize_chunked(&self, text: &str, language: Language, truncated: bool) -> SynthesisResult {
        let chunks = self.chunker.chunk(text);
        let total = chunks.len();
        tracing::debug!(language = %language, chunks = total, "Synthesizing in chunks");

        let backend = &self.backend;
        let retry = &self.retry;
        let slots = self
            .pool
            .run_indexed(
                chunks.into_iter().map(|c| c.text).collect(),
                self.config.max_concurrent_chunks,
                self.config.batch_timeout(),
                move |index, chunk_text: String| async move {
                    let chunk_text = chunk_text.as_str();
                    let result = retry
                        .run("synthesize_chunk", move |_| backend.synthesize(chunk_text, language))
                        .await;
                    if let Err(e) = &result {
                        tracing::warn!(chunk = index, error = %e, "Chunk synthesis failed");
                    }
                    result
                },
            )
            .await;

        let audio_chunks: Vec<AudioChunk> = slots
            .into_iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Some(Ok(bytes)) if is_wav(&bytes) => Some(AudioChunk { index, bytes }),
                Some(Ok(bytes)) => {
                    tracing::warn!(chunk = index, bytes = bytes.len(), "Chunk audio is not WAV");
                    None
                }
                _ => None,
            })
            .collect();
        let failed = total - audio_chunks.len();

        if audio_chunks.is_empty() {
            tracing::warn!(chunks = total, "Every chunk failed to synthesize");
            return SynthesisResult::failed(total, truncated);
        }
        if failed > 0 {
            let missing: Vec<usize> = (0..total)
                .filter(|i| !audio_chunks.iter().any(|c| c.index == *i))
                .collect();
            tracing::warn!(chunks = total, failed, ?missing, "Partial synthesis, failed chunks left out");
        }

        let ordered: Vec<&[u8]> = audio_chunks.iter().map(|c| c.bytes.as_slice()).collect();
        match concat_wav(&ordered) {
            Ok(audio) => SynthesisResult {
                audio,
                success: true,
                chunks_total: total,
                chunks_failed: failed,
                truncated,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Could not join synthesized chunks");
                SynthesisResult::failed(total, truncated)
            }
        }
    }
}
