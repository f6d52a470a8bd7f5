//! Voice query workflow
//!
//! One query moves through a strictly linear sequence of stages:
//!
//! ```text
//! Captured -> Transcribed -> (TranslatedToEnglish) -> Answered
//!          -> (TranslatedToSource) -> Synthesized -> Done
//! ```
//!
//! Bracketed stages are skipped for English. A failed transcription ends the
//! workflow at `TranscriptionFailed`; every later failure degrades the result
//! and is reported as a [`WorkflowWarning`] instead:
//! - forward translation fails: the untranslated question is answered
//! - answer service fails: a fixed apology is used as the answer
//! - reverse translation fails: the English answer is shown and spoken, with
//!   `display_language` set to English
//! - synthesis fails: text only, no audio

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use agri_voice_config::Settings;
use agri_voice_core::{
    Answer, AnswerGenerator, AudioClip, Error, Language, Passage, Result, SpeechToText,
    TextToSpeech, Translator,
};
use agri_voice_text_processing::{detect_text_language, TranslationClient};
use agri_voice_transport::WorkerPool;

use crate::stt::TranscriptionClient;
use crate::tts::SpeechSynthesizer;

/// Answer used when the answer service is unavailable
pub const ANSWER_APOLOGY: &str =
    "Sorry, I could not find an answer right now. Please try again in a moment.";

/// Workflow stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Captured,
    Transcribed,
    TranslatedToEnglish,
    Answered,
    TranslatedToSource,
    Synthesized,
    Done,
    TranscriptionFailed,
}

/// Non-fatal degradation surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowWarning {
    /// Spoken language fell back to the English default
    LowConfidenceLanguage,
    /// Question answered in its original language
    ForwardTranslationFailed,
    /// Some translation chunks kept their original text
    PartialTranslation,
    AnswerFailed,
    /// Showing the English answer instead of a translation
    ReverseTranslationFailed,
    SynthesisFailed,
    /// Some synthesis chunks are missing from the audio
    PartialSynthesis,
    /// Spoken answer was shortened
    SynthesisTruncated,
    /// Speech services are unavailable; English text only
    VoiceDisabled,
}

impl WorkflowWarning {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowConfidenceLanguage => "low_confidence_language",
            Self::ForwardTranslationFailed => "forward_translation_failed",
            Self::PartialTranslation => "partial_translation",
            Self::AnswerFailed => "answer_failed",
            Self::ReverseTranslationFailed => "reverse_translation_failed",
            Self::SynthesisFailed => "synthesis_failed",
            Self::PartialSynthesis => "partial_synthesis",
            Self::SynthesisTruncated => "synthesis_truncated",
            Self::VoiceDisabled => "voice_disabled",
        }
    }
}

/// Wall-clock time per stage; zero for skipped stages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageTimings {
    pub transcription_ms: u64,
    pub forward_translation_ms: u64,
    pub answer_ms: u64,
    pub reverse_translation_ms: u64,
    pub synthesis_ms: u64,
    pub total_ms: u64,
}

/// Everything one query produced, for display
#[derive(Debug, Clone, Serialize)]
pub struct VoiceWorkflowResult {
    /// Final stage reached
    pub stage: WorkflowStage,
    /// Stages passed through, in order
    pub stages: Vec<WorkflowStage>,
    /// Question in the user's language
    pub transcript: String,
    pub language: Language,
    pub language_confident: bool,
    /// Question sent to the answer service
    pub english_text: String,
    pub english_answer: String,
    /// Answer to show; the English answer when reverse translation failed
    pub translated_answer: String,
    /// Language `translated_answer` is actually in
    pub display_language: Language,
    pub passages: Vec<Passage>,
    /// Spoken answer as WAV
    #[serde(skip)]
    pub audio: Option<Vec<u8>>,
    pub transcription_success: bool,
    pub forward_translation_success: bool,
    pub answer_success: bool,
    pub reverse_translation_success: bool,
    pub synthesis_requested: bool,
    pub synthesis_success: bool,
    pub warnings: Vec<WorkflowWarning>,
    pub timings: StageTimings,
}

impl VoiceWorkflowResult {
    fn captured(language: Language) -> Self {
        Self {
            stage: WorkflowStage::Captured,
            stages: vec![WorkflowStage::Captured],
            transcript: String::new(),
            language,
            language_confident: true,
            english_text: String::new(),
            english_answer: String::new(),
            translated_answer: String::new(),
            display_language: language,
            passages: Vec::new(),
            audio: None,
            transcription_success: false,
            forward_translation_success: false,
            answer_success: false,
            reverse_translation_success: false,
            synthesis_requested: false,
            synthesis_success: false,
            warnings: Vec::new(),
            timings: StageTimings::default(),
        }
    }

    fn enter(&mut self, stage: WorkflowStage) {
        self.stage = stage;
        self.stages.push(stage);
    }

    /// Enter a terminal stage and record the total time
    fn finish(&mut self, stage: WorkflowStage, start: Instant) {
        self.enter(stage);
        self.timings.total_ms = start.elapsed().as_millis() as u64;
    }

    fn warn(&mut self, warning: WorkflowWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    /// Reached `Done`, possibly with warnings
    pub fn is_complete(&self) -> bool {
        self.stage == WorkflowStage::Done
    }

    pub fn has_warning(&self, warning: WorkflowWarning) -> bool {
        self.warnings.contains(&warning)
    }
}

/// Answer an English question without any speech services
///
/// Used when the speech API is unreachable or rejected every credential: the
/// question goes to the answer service as typed and the answer stays English.
pub async fn answer_text_only(
    answerer: &dyn AnswerGenerator,
    text: &str,
    language: Language,
) -> VoiceWorkflowResult {
    let start = Instant::now();
    let mut result = VoiceWorkflowResult::captured(language);
    result.transcript = text.trim().to_string();
    result.transcription_success = true;
    result.english_text = result.transcript.clone();
    result.forward_translation_success = language.is_english();
    result.display_language = Language::English;
    result.warn(WorkflowWarning::VoiceDisabled);

    let answer_start = Instant::now();
    let outcome = answerer.answer(&result.english_text).await;
    apply_answer(&mut result, outcome);
    result.timings.answer_ms = answer_start.elapsed().as_millis() as u64;
    result.enter(WorkflowStage::Answered);

    result.translated_answer = result.english_answer.clone();
    result.reverse_translation_success = language.is_english();
    result.finish(WorkflowStage::Done, start);
    result
}

fn apply_answer(result: &mut VoiceWorkflowResult, outcome: Result<Answer>) {
    match outcome {
        Ok(answer) if !answer.answer.trim().is_empty() => {
            result.english_answer = answer.answer.trim().to_string();
            result.passages = answer.supporting_passages;
            result.answer_success = true;
        }
        Ok(_) => {
            tracing::warn!("Answer service returned an empty answer");
            result.english_answer = ANSWER_APOLOGY.to_string();
            result.warn(WorkflowWarning::AnswerFailed);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Answer service failed, using apology");
            result.english_answer = ANSWER_APOLOGY.to_string();
            result.warn(WorkflowWarning::AnswerFailed);
        }
    }
}

/// Voice query workflow
///
/// Owns one [`WorkerPool`] shared by detection, translation and synthesis so
/// a single query never has more outbound requests in flight than the
/// configured cap.
pub struct VoiceWorkflow {
    transcriber: TranscriptionClient,
    translator: TranslationClient,
    synthesizer: SpeechSynthesizer,
    answerer: Arc<dyn AnswerGenerator>,
    answer_timeout: Duration,
    pool: WorkerPool,
}

impl VoiceWorkflow {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        translator: Arc<dyn Translator>,
        tts: Arc<dyn TextToSpeech>,
        answerer: Arc<dyn AnswerGenerator>,
        settings: &Settings,
    ) -> Self {
        let pool = WorkerPool::new(settings.workflow.max_concurrent_requests);
        tracing::info!(
            stt = stt.model_name(),
            translator = translator.model_name(),
            tts = tts.model_name(),
            answerer = answerer.name(),
            max_concurrent_requests = pool.capacity(),
            "Voice workflow ready"
        );
        Self {
            transcriber: TranscriptionClient::new(stt, pool.clone(), &settings.stt),
            translator: TranslationClient::new(translator, pool.clone(), settings.translation.clone()),
            synthesizer: SpeechSynthesizer::new(tts, pool.clone(), settings.tts.clone()),
            answerer,
            answer_timeout: settings.answer.timeout(),
            pool,
        }
    }

    pub fn transcriber(&self) -> &TranscriptionClient {
        &self.transcriber
    }

    pub fn translator(&self) -> &TranslationClient {
        &self.translator
    }

    pub fn synthesizer(&self) -> &SpeechSynthesizer {
        &self.synthesizer
    }

    pub fn answerer(&self) -> &dyn AnswerGenerator {
        self.answerer.as_ref()
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Run a spoken query; `hint` skips language detection
    pub async fn run_voice(
        &self,
        clip: &AudioClip,
        hint: Option<Language>,
        synthesize: bool,
    ) -> VoiceWorkflowResult {
        let start = Instant::now();
        let mut result = VoiceWorkflowResult::captured(hint.unwrap_or_default());

        tracing::info!(
            bytes = clip.len(),
            format = clip.extension(),
            hint = ?hint,
            "Voice query received"
        );

        let stt_start = Instant::now();
        let transcription = self.transcriber.transcribe(clip, hint).await;
        result.timings.transcription_ms = stt_start.elapsed().as_millis() as u64;

        result.language = transcription.language;
        result.display_language = transcription.language;
        result.language_confident = transcription.language_confident;
        if !transcription.language_confident {
            result.warn(WorkflowWarning::LowConfidenceLanguage);
        }

        if !transcription.success {
            result.finish(WorkflowStage::TranscriptionFailed, start);
            tracing::warn!(
                language = %result.language,
                total_ms = result.timings.total_ms,
                "Transcription failed, nothing to answer"
            );
            return result;
        }

        result.transcript = transcription.text;
        result.transcription_success = true;
        result.enter(WorkflowStage::Transcribed);

        self.complete(result, synthesize, start).await
    }

    /// Run a typed query; the language is guessed from the script when absent
    pub async fn run_text(
        &self,
        text: &str,
        language: Option<Language>,
        synthesize: bool,
    ) -> VoiceWorkflowResult {
        let start = Instant::now();
        let language = language.unwrap_or_else(|| detect_text_language(text));
        let mut result = VoiceWorkflowResult::captured(language);

        if text.trim().is_empty() {
            result.finish(WorkflowStage::TranscriptionFailed, start);
            return result;
        }

        result.transcript = text.trim().to_string();
        result.transcription_success = true;
        result.enter(WorkflowStage::Transcribed);

        self.complete(result, synthesize, start).await
    }

    /// Stages after the question text is known
    async fn complete(
        &self,
        mut result: VoiceWorkflowResult,
        synthesize: bool,
        start: Instant,
    ) -> VoiceWorkflowResult {
        let language = result.language;

        // Forward translation
        if language.is_english() {
            result.english_text = result.transcript.clone();
            result.forward_translation_success = true;
        } else {
            let stage_start = Instant::now();
            let forward = self
                .translator
                .translate(&result.transcript, language, Language::English)
                .await;
            result.timings.forward_translation_ms = stage_start.elapsed().as_millis() as u64;

            if forward.is_partial() {
                result.warn(WorkflowWarning::PartialTranslation);
            }
            if !forward.success {
                tracing::warn!(language = %language, "Answering the untranslated question");
                result.warn(WorkflowWarning::ForwardTranslationFailed);
            }
            result.forward_translation_success = forward.success;
            result.english_text = forward.text;
            result.enter(WorkflowStage::TranslatedToEnglish);
        }

        // Answer
        let stage_start = Instant::now();
        let call = self.answerer.answer(&result.english_text);
        let outcome = tokio::time::timeout(self.answer_timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(Error::Timeout(format!(
                    "answer service exceeded {}s",
                    self.answer_timeout.as_secs()
                )))
            });
        apply_answer(&mut result, outcome);
        result.timings.answer_ms = stage_start.elapsed().as_millis() as u64;
        result.enter(WorkflowStage::Answered);

        // Reverse translation
        if language.is_english() {
            result.translated_answer = result.english_answer.clone();
            result.display_language = Language::English;
            result.reverse_translation_success = true;
        } else {
            let stage_start = Instant::now();
            let reverse = self
                .translator
                .translate(&result.english_answer, Language::English, language)
                .await;
            result.timings.reverse_translation_ms = stage_start.elapsed().as_millis() as u64;

            if reverse.success {
                if reverse.is_partial() {
                    result.warn(WorkflowWarning::PartialTranslation);
                }
                result.translated_answer = reverse.text;
                result.display_language = language;
            } else {
                tracing::warn!(language = %language, "Showing the English answer");
                result.translated_answer = result.english_answer.clone();
                result.display_language = Language::English;
                result.warn(WorkflowWarning::ReverseTranslationFailed);
            }
            result.reverse_translation_success = reverse.success;
            result.enter(WorkflowStage::TranslatedToSource);
        }

        // Synthesis
        result.synthesis_requested = synthesize;
        if synthesize {
            let stage_start = Instant::now();
            let synthesis = self
                .synthesizer
                .synthesize(&result.translated_answer, result.display_language)
                .await;
            result.timings.synthesis_ms = stage_start.elapsed().as_millis() as u64;

            if synthesis.truncated {
                result.warn(WorkflowWarning::SynthesisTruncated);
            }
            if synthesis.success {
                if synthesis.is_partial() {
                    result.warn(WorkflowWarning::PartialSynthesis);
                }
                result.audio = Some(synthesis.audio);
                result.synthesis_success = true;
                result.enter(WorkflowStage::Synthesized);
            } else {
                result.warn(WorkflowWarning::SynthesisFailed);
            }
        }

        result.finish(WorkflowStage::Done, start);

        tracing::info!(
            language = %result.language,
            display_language = %result.display_language,
            answer_success = result.answer_success,
            audio_bytes = result.audio.as_ref().map_or(0, |a| a.len()),
            warnings = ?result.warnings,
            total_ms = result.timings.total_ms,
            "Voice workflow complete"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_records_total_time() {
        let start = Instant::now() - Duration::from_millis(40);
        let mut result = VoiceWorkflowResult::captured(Language::Hindi);
        result.finish(WorkflowStage::TranscriptionFailed, start);

        assert_eq!(result.stage, WorkflowStage::TranscriptionFailed);
        assert_eq!(
            result.stages,
            vec![WorkflowStage::Captured, WorkflowStage::TranscriptionFailed]
        );
        assert!(result.timings.total_ms >= 40);
    }
}
