//! Language catalog for the speech, translation and synthesis endpoints
//!
//! English plus the scheduled Indian languages the speech API accepts. Each
//! entry carries the locale code sent on the wire and a display name written
//! in the language's own script.

use serde::{Deserialize, Serialize};

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Bengali,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Marathi,
    Gujarati,
    Punjabi,
    Odia,
    Assamese,
    Urdu,
    Nepali,
    Konkani,
    Maithili,
    Sanskrit,
    Sindhi,
    Kashmiri,
    Dogri,
    Bodo,
    Manipuri,
    Santali,
}

impl Language {
    /// Locale code consumed by the speech, translation and TTS endpoints
    pub fn api_code(&self) -> &'static str {
        match self {
            Self::English => "en-IN",
            Self::Hindi => "hi-IN",
            Self::Bengali => "bn-IN",
            Self::Tamil => "ta-IN",
            Self::Telugu => "te-IN",
            Self::Kannada => "kn-IN",
            Self::Malayalam => "ml-IN",
            Self::Marathi => "mr-IN",
            Self::Gujarati => "gu-IN",
            Self::Punjabi => "pa-IN",
            Self::Odia => "od-IN",
            Self::Assamese => "as-IN",
            Self::Urdu => "ur-IN",
            Self::Nepali => "ne-IN",
            Self::Konkani => "kok-IN",
            Self::Maithili => "mai-IN",
            Self::Sanskrit => "sa-IN",
            Self::Sindhi => "sd-IN",
            Self::Kashmiri => "ks-IN",
            Self::Dogri => "doi-IN",
            Self::Bodo => "brx-IN",
            Self::Manipuri => "mni-IN",
            Self::Santali => "sat-IN",
        }
    }

    /// English name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Bengali => "Bengali",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Kannada => "Kannada",
            Self::Malayalam => "Malayalam",
            Self::Marathi => "Marathi",
            Self::Gujarati => "Gujarati",
            Self::Punjabi => "Punjabi",
            Self::Odia => "Odia",
            Self::Assamese => "Assamese",
            Self::Urdu => "Urdu",
            Self::Nepali => "Nepali",
            Self::Konkani => "Konkani",
            Self::Maithili => "Maithili",
            Self::Sanskrit => "Sanskrit",
            Self::Sindhi => "Sindhi",
            Self::Kashmiri => "Kashmiri",
            Self::Dogri => "Dogri",
            Self::Bodo => "Bodo",
            Self::Manipuri => "Manipuri",
            Self::Santali => "Santali",
        }
    }

    /// Display name in the language's own script
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "हिन्दी",
            Self::Bengali => "বাংলা",
            Self::Tamil => "தமிழ்",
            Self::Telugu => "తెలుగు",
            Self::Kannada => "ಕನ್ನಡ",
            Self::Malayalam => "മലയാളം",
            Self::Marathi => "मराठी",
            Self::Gujarati => "ગુજરાતી",
            Self::Punjabi => "ਪੰਜਾਬੀ",
            Self::Odia => "ଓଡ଼ିଆ",
            Self::Assamese => "অসমীয়া",
            Self::Urdu => "اردو",
            Self::Nepali => "नेपाली",
            Self::Konkani => "कोंकणी",
            Self::Maithili => "मैथिली",
            Self::Sanskrit => "संस्कृतम्",
            Self::Sindhi => "سنڌي",
            Self::Kashmiri => "کٲشُر",
            Self::Dogri => "डोगरी",
            Self::Bodo => "बड़ो",
            Self::Manipuri => "ꯃꯤꯇꯩꯂꯣꯟ",
            Self::Santali => "ᱥᱟᱱᱛᱟᱲᱤ",
        }
    }

    /// Script used by this language
    pub fn script(&self) -> Script {
        match self {
            Self::Hindi
            | Self::Marathi
            | Self::Nepali
            | Self::Konkani
            | Self::Maithili
            | Self::Sanskrit
            | Self::Dogri
            | Self::Bodo => Script::Devanagari,
            Self::Bengali | Self::Assamese => Script::Bengali,
            Self::Tamil => Script::Tamil,
            Self::Telugu => Script::Telugu,
            Self::Kannada => Script::Kannada,
            Self::Malayalam => Script::Malayalam,
            Self::Gujarati => Script::Gujarati,
            Self::Punjabi => Script::Gurmukhi,
            Self::Odia => Script::Odia,
            Self::Urdu | Self::Sindhi | Self::Kashmiri => Script::Arabic,
            Self::Manipuri => Script::MeeteiMayek,
            Self::Santali => Script::OlChiki,
            Self::English => Script::Latin,
        }
    }

    pub fn is_english(&self) -> bool {
        matches!(self, Self::English)
    }

    /// Parse a locale code, bare ISO code or name (case-insensitive)
    ///
    /// Accepts `hi-IN`, `hi_IN`, `hi`, `hindi` and the native display name.
    pub fn from_code_loose(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if let Some(lang) = Self::all().iter().find(|l| l.display_name() == trimmed) {
            return Some(*lang);
        }

        let lowered = trimmed.to_lowercase();
        let base = lowered
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default();
        match base {
            "en" | "eng" | "english" => Some(Self::English),
            "hi" | "hin" | "hindi" => Some(Self::Hindi),
            "bn" | "ben" | "bengali" | "bangla" => Some(Self::Bengali),
            "ta" | "tam" | "tamil" => Some(Self::Tamil),
            "te" | "tel" | "telugu" => Some(Self::Telugu),
            "kn" | "kan" | "kannada" => Some(Self::Kannada),
            "ml" | "mal" | "malayalam" => Some(Self::Malayalam),
            "mr" | "mar" | "marathi" => Some(Self::Marathi),
            "gu" | "guj" | "gujarati" => Some(Self::Gujarati),
            "pa" | "pan" | "punjabi" | "panjabi" => Some(Self::Punjabi),
            "od" | "or" | "ori" | "odia" | "oriya" => Some(Self::Odia),
            "as" | "asm" | "assamese" => Some(Self::Assamese),
            "ur" | "urd" | "urdu" => Some(Self::Urdu),
            "ne" | "nep" | "nepali" => Some(Self::Nepali),
            "kok" | "konkani" => Some(Self::Konkani),
            "mai" | "maithili" => Some(Self::Maithili),
            "sa" | "san" | "sanskrit" => Some(Self::Sanskrit),
            "sd" | "snd" | "sindhi" => Some(Self::Sindhi),
            "ks" | "kas" | "kashmiri" => Some(Self::Kashmiri),
            "doi" | "dogri" => Some(Self::Dogri),
            "brx" | "bodo" => Some(Self::Bodo),
            "mni" | "manipuri" | "meitei" => Some(Self::Manipuri),
            "sat" | "santali" | "santhali" => Some(Self::Santali),
            _ => None,
        }
    }

    /// Parse, falling back to English for anything unrecognised
    pub fn parse_or_default(s: &str) -> Self {
        Self::from_code_loose(s).unwrap_or_else(|| {
            tracing::debug!(input = s, "Unknown language code, defaulting to English");
            Self::English
        })
    }

    /// Every supported language
    pub fn all() -> &'static [Language] {
        &[
            Self::English,
            Self::Hindi,
            Self::Bengali,
            Self::Tamil,
            Self::Telugu,
            Self::Kannada,
            Self::Malayalam,
            Self::Marathi,
            Self::Gujarati,
            Self::Punjabi,
            Self::Odia,
            Self::Assamese,
            Self::Urdu,
            Self::Nepali,
            Self::Konkani,
            Self::Maithili,
            Self::Sanskrit,
            Self::Sindhi,
            Self::Kashmiri,
            Self::Dogri,
            Self::Bodo,
            Self::Manipuri,
            Self::Santali,
        ]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Script systems used by the supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Script {
    Latin,
    Devanagari,
    Bengali,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Gujarati,
    Gurmukhi,
    Odia,
    Arabic,
    OlChiki,
    MeeteiMayek,
}

impl Script {
    /// Unicode block for this script (first block only)
    pub fn unicode_range(&self) -> (u32, u32) {
        match self {
            Self::Latin => (0x0000, 0x007F),
            Self::Devanagari => (0x0900, 0x097F),
            Self::Bengali => (0x0980, 0x09FF),
            Self::Gurmukhi => (0x0A00, 0x0A7F),
            Self::Gujarati => (0x0A80, 0x0AFF),
            Self::Odia => (0x0B00, 0x0B7F),
            Self::Tamil => (0x0B80, 0x0BFF),
            Self::Telugu => (0x0C00, 0x0C7F),
            Self::Kannada => (0x0C80, 0x0CFF),
            Self::Malayalam => (0x0D00, 0x0D7F),
            Self::Arabic => (0x0600, 0x06FF),
            Self::OlChiki => (0x1C50, 0x1C7F),
            Self::MeeteiMayek => (0xABC0, 0xABFF),
        }
    }

    /// Check if a character belongs to this script
    pub fn contains_char(&self, c: char) -> bool {
        let code = c as u32;
        let (start, end) = self.unicode_range();
        code >= start && code <= end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_codes() {
        assert_eq!(Language::Hindi.api_code(), "hi-IN");
        assert_eq!(Language::Odia.api_code(), "od-IN");
        assert_eq!(Language::English.api_code(), "en-IN");
    }

    #[test]
    fn test_from_code_loose() {
        assert_eq!(Language::from_code_loose("hi-IN"), Some(Language::Hindi));
        assert_eq!(Language::from_code_loose("ta_in"), Some(Language::Tamil));
        assert_eq!(Language::from_code_loose("Malayalam"), Some(Language::Malayalam));
        assert_eq!(Language::from_code_loose("or"), Some(Language::Odia));
        assert_eq!(Language::from_code_loose("தமிழ்"), Some(Language::Tamil));
        assert_eq!(Language::from_code_loose("klingon"), None);
    }

    #[test]
    fn test_unknown_defaults_to_english() {
        assert_eq!(Language::parse_or_default("xx-YY"), Language::English);
        assert_eq!(Language::parse_or_default(""), Language::English);
    }

    #[test]
    fn test_every_language_round_trips_through_its_code() {
        for lang in Language::all() {
            assert_eq!(Language::from_code_loose(lang.api_code()), Some(*lang));
            assert!(!lang.display_name().is_empty());
        }
    }

    #[test]
    fn test_scripts() {
        assert_eq!(Language::Marathi.script(), Script::Devanagari);
        assert_eq!(Language::Assamese.script(), Script::Bengali);
        assert!(Script::Tamil.contains_char('வ'));
        assert!(!Script::Tamil.contains_char('a'));
    }
}
