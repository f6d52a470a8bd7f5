//! Scripted backends for unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use agri_voice_core::{AudioClip, Language, Result, SpeechToText, TextToSpeech};
use async_trait::async_trait;

type SttBehaviour = dyn Fn(Language) -> Result<String> + Send + Sync;

pub(crate) struct ScriptedStt {
    calls: AtomicUsize,
    languages: Mutex<Vec<Language>>,
    behaviour: Box<SttBehaviour>,
}

impl ScriptedStt {
    pub(crate) fn new(behaviour: impl Fn(Language) -> Result<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            languages: Mutex::new(Vec::new()),
            behaviour: Box::new(behaviour),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn languages(&self) -> Vec<Language> {
        self.languages.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechToText for ScriptedStt {
    async fn transcribe(&self, _audio: &AudioClip, language: Language) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.languages.lock().unwrap().push(language);
        (self.behaviour)(language)
    }

    fn model_name(&self) -> &str {
        "scripted-stt"
    }
}

type TtsBehaviour = dyn Fn(&str, usize) -> Result<Vec<u8>> + Send + Sync;

/// TTS double; the behaviour sees the text and the 1-based call number
pub(crate) struct ScriptedTts {
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
    behaviour: Box<TtsBehaviour>,
}

impl ScriptedTts {
    pub(crate) fn new(behaviour: impl Fn(&str, usize) -> Result<Vec<u8>> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
            behaviour: Box::new(behaviour),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextToSpeech for ScriptedTts {
    async fn synthesize(&self, text: &str, _language: Language) -> Result<Vec<u8>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.texts.lock().unwrap().push(text.to_string());
        (self.behaviour)(text, call)
    }

    fn model_name(&self) -> &str {
        "scripted-tts"
    }
}

/// Canonical 44-byte-header PCM WAV with `data_len` bytes of samples
pub(crate) fn wav_with_data(data_len: usize, fill: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(44 + data_len);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&((36 + data_len) as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&22050u32.to_le_bytes());
    out.extend_from_slice(&44100u32.to_le_bytes()); // byte rate
    out.extend_from_slice(&2u16.to_le_bytes()); // block align
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_len as u32).to_le_bytes());
    out.extend(std::iter::repeat(fill).take(data_len));
    out
}
