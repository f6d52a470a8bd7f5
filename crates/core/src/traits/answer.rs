//! Retrieval + generation capability

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A retrieved passage backing an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Generated answer with the passages it was grounded on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    #[serde(default)]
    pub supporting_passages: Vec<Passage>,
}

/// Answers an English question from the knowledge base
///
/// Always called with English text. May take several seconds; the pipeline
/// does not retry around it.
#[async_trait]
pub trait AnswerGenerator: Send + Sync + 'static {
    async fn answer(&self, question: &str) -> Result<Answer>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_without_passages_parses() {
        let answer: Answer = serde_json::from_str(r#"{"answer": "Use urea in two splits."}"#).unwrap();
        assert_eq!(answer.answer, "Use urea in two splits.");
        assert!(answer.supporting_passages.is_empty());

        let answer: Answer = serde_json::from_str(
            r#"{"answer": "x", "supporting_passages": [{"text": "soil pH 6.5"}]}"#,
        )
        .unwrap();
        assert_eq!(answer.supporting_passages[0].source, None);
    }
}
