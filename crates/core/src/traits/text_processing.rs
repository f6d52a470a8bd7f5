//! Text processing traits

use crate::{Language, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request style understood by the translation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TranslationMode {
    #[default]
    Formal,
    ModernColloquial,
    ClassicColloquial,
    CodeMixed,
}

impl TranslationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationMode::Formal => "formal",
            TranslationMode::ModernColloquial => "modern-colloquial",
            TranslationMode::ClassicColloquial => "classic-colloquial",
            TranslationMode::CodeMixed => "code-mixed",
        }
    }
}

impl std::fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translation backend
///
/// A single request; callers keep `text` under the endpoint's size limit.
///
/// # Example
///
/// ```ignore
/// let english = translator
///     .translate("धान में कौन सा खाद डालें", Language::Hindi, Language::English, TranslationMode::Formal)
///     .await?;
/// ```
#[async_trait]
pub trait Translator: Send + Sync + 'static {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
        mode: TranslationMode,
    ) -> Result<String>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
