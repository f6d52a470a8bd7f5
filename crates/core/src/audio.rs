//! Audio containers and the magic-byte format sniffer

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Bytes inspected by [`detect_format`]
pub const SNIFF_PREFIX_LEN: usize = 20;

/// Audio container formats recognised by signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Wav,
    Mp3,
    Ogg,
    Flac,
    M4a,
    /// No signature matched; sent upstream as WAV
    Unknown,
}

impl AudioFormat {
    /// File extension used when uploading
    ///
    /// `Unknown` maps to `wav`, the same default the sniffer applies.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav | AudioFormat::Unknown => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::M4a => "m4a",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav | AudioFormat::Unknown => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::M4a => "audio/mp4",
        }
    }

    /// Classify a byte buffer by its leading signature
    pub fn sniff(bytes: &[u8]) -> Self {
        let prefix = &bytes[..bytes.len().min(SNIFF_PREFIX_LEN)];

        if prefix.len() >= 12 && &prefix[0..4] == b"RIFF" && &prefix[8..12] == b"WAVE" {
            return AudioFormat::Wav;
        }
        if prefix.starts_with(b"ID3") {
            return AudioFormat::Mp3;
        }
        // MPEG-1 Layer III frame sync (with and without CRC, and MPEG-2)
        if prefix.len() >= 2 && prefix[0] == 0xFF && matches!(prefix[1], 0xFB | 0xF3 | 0xF2) {
            return AudioFormat::Mp3;
        }
        if prefix.starts_with(b"OggS") {
            return AudioFormat::Ogg;
        }
        if prefix.starts_with(b"fLaC") {
            return AudioFormat::Flac;
        }
        if prefix.len() >= 8 && &prefix[4..8] == b"ftyp" {
            return AudioFormat::M4a;
        }

        AudioFormat::Unknown
    }
}

/// Detect `(extension, mime_type)` for raw audio bytes
///
/// Unmatched or empty input yields `("wav", "audio/wav")`.
pub fn detect_format(bytes: &[u8]) -> (&'static str, &'static str) {
    let format = AudioFormat::sniff(bytes);
    (format.extension(), format.mime_type())
}

/// Captured or uploaded audio, immutable after construction
#[derive(Clone)]
pub struct AudioClip {
    bytes: Arc<[u8]>,
    format: AudioFormat,
}

impl AudioClip {
    /// Wrap raw bytes, sniffing the container format
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        let format = AudioFormat::sniff(&bytes);
        Self {
            bytes: bytes.into(),
            format,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Upload file name, e.g. `audio.ogg`
    pub fn file_name(&self) -> String {
        format!("audio.{}", self.extension())
    }
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("len", &self.bytes.len())
            .field("format", &self.format)
            .finish()
    }
}
