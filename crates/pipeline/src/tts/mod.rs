//! Text-to-speech
//!
//! [`SarvamTts`] is the raw backend; [`SpeechSynthesizer`] caps length,
//! chunks long text and joins the resulting WAV files with [`concat_wav`].

mod http_backend;
mod synthesizer;
mod wav;

pub use http_backend::SarvamTts;
pub use synthesizer::{truncate_for_speech, SpeechSynthesizer};
pub use wav::{concat_wav, is_wav, WavError, WAV_HEADER_LEN};
