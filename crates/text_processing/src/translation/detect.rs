//! Text language heuristic for typed queries
//!
//! Table-driven: the first script block (in priority order) with at least one
//! character in the text decides the language. Latin-only text is English,
//! either because enough English function words were found or by default.

use agri_voice_core::{Language, Script};

/// Script blocks checked in order; first match wins
pub const SCRIPT_PRIORITY: &[(Script, Language)] = &[
    (Script::Devanagari, Language::Hindi),
    (Script::Tamil, Language::Tamil),
    (Script::Telugu, Language::Telugu),
    (Script::Malayalam, Language::Malayalam),
    (Script::Gujarati, Language::Gujarati),
    (Script::Kannada, Language::Kannada),
    (Script::Bengali, Language::Bengali),
    (Script::Gurmukhi, Language::Punjabi),
    (Script::Odia, Language::Odia),
    (Script::Arabic, Language::Urdu),
    (Script::OlChiki, Language::Santali),
    (Script::MeeteiMayek, Language::Manipuri),
];

const ENGLISH_FUNCTION_WORDS: &[&str] = &[
    "the", "is", "are", "was", "what", "which", "how", "when", "where", "why", "who", "to",
    "of", "in", "on", "for", "and", "or", "my", "i", "a", "an", "should", "can", "do", "does",
    "with", "this", "that", "it", "be", "will",
];

/// How the language was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLanguageBasis {
    /// A non-Latin script block matched
    Script(Script),
    /// Enough English function words were present
    EnglishWords(usize),
    /// Nothing matched
    Default,
}

/// Heuristic language classification of raw text
#[derive(Debug, Clone, Copy)]
pub struct ScriptDetector {
    /// Function words needed to call Latin text English on evidence
    english_word_threshold: usize,
}

impl Default for ScriptDetector {
    fn default() -> Self {
        Self {
            english_word_threshold: 2,
        }
    }
}

impl ScriptDetector {
    pub fn new(english_word_threshold: usize) -> Self {
        Self {
            english_word_threshold: english_word_threshold.max(1),
        }
    }

    /// Classify `text`, reporting what the decision was based on
    pub fn classify(&self, text: &str) -> (Language, TextLanguageBasis) {
        for (script, language) in SCRIPT_PRIORITY {
            if text.chars().any(|c| script.contains_char(c)) {
                return (*language, TextLanguageBasis::Script(*script));
            }
        }

        let english_words = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphabetic()))
            .filter(|w| {
                ENGLISH_FUNCTION_WORDS
                    .iter()
                    .any(|f| f.eq_ignore_ascii_case(w))
            })
            .count();

        if english_words >= self.english_word_threshold {
            (Language::English, TextLanguageBasis::EnglishWords(english_words))
        } else {
            (Language::English, TextLanguageBasis::Default)
        }
    }

    pub fn detect(&self, text: &str) -> Language {
        self.classify(text).0
    }
}

/// Detect the likely language of typed text with default settings
pub fn detect_text_language(text: &str) -> Language {
    ScriptDetector::default().detect(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_blocks() {
        assert_eq!(detect_text_language("गेहूं में कौन सा खाद डालें?"), Language::Hindi);
        assert_eq!(detect_text_language("நெல் பயிருக்கு உரம்"), Language::Tamil);
        assert_eq!(detect_text_language("వరి పంటకు ఎరువు"), Language::Telugu);
        assert_eq!(detect_text_language("നെല്ലിന് വളം"), Language::Malayalam);
        assert_eq!(detect_text_language("ઘઉં માટે ખાતર"), Language::Gujarati);
        assert_eq!(detect_text_language("ಭತ್ತಕ್ಕೆ ಗೊಬ್ಬರ"), Language::Kannada);
        assert_eq!(detect_text_language("ধানের সার"), Language::Bengali);
        assert_eq!(detect_text_language("ਕਣਕ ਲਈ ਖਾਦ"), Language::Punjabi);
        assert_eq!(detect_text_language("ଧାନ ପାଇଁ ସାର"), Language::Odia);
    }

    #[test]
    fn test_priority_order_for_mixed_scripts() {
        // Devanagari outranks Tamil
        assert_eq!(detect_text_language("நெல் और धान"), Language::Hindi);
        // Tamil outranks Bengali
        assert_eq!(detect_text_language("ধান நெல்"), Language::Tamil);
    }

    #[test]
    fn test_english_by_function_words() {
        let detector = ScriptDetector::default();
        let (lang, basis) = detector.classify("What is the best fertilizer for wheat?");
        assert_eq!(lang, Language::English);
        assert!(matches!(basis, TextLanguageBasis::EnglishWords(n) if n >= 2));
    }

    #[test]
    fn test_unknown_latin_defaults_to_english() {
        let (lang, basis) = ScriptDetector::default().classify("gehu khaad urea");
        assert_eq!(lang, Language::English);
        assert_eq!(basis, TextLanguageBasis::Default);

        assert_eq!(detect_text_language(""), Language::English);
        assert_eq!(detect_text_language("12345 !!"), Language::English);
    }
}
