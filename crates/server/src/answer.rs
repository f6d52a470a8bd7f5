//! Remote retrieval + generation service
//!
//! The knowledge base and the model that answers from it live in a separate
//! service. This client POSTs `{"question": ...}` and reads
//! `{"answer": ..., "supporting_passages": [...]}`. No retries: the service
//! is slow and a second attempt would double the wait.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;

use agri_voice_config::AnswerConfig;
use agri_voice_core::{Answer, AnswerGenerator, Error, Result};

#[derive(Debug, Serialize)]
struct AnswerRequest<'a> {
    question: &'a str,
}

/// HTTP client for the answer service
pub struct RemoteAnswerService {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl RemoteAnswerService {
    pub fn new(config: &AnswerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            url: config.url.clone(),
            timeout: config.timeout(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnswerGenerator for RemoteAnswerService {
    async fn answer(&self, question: &str) -> Result<Answer> {
        let start = Instant::now();
        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .json(&AnswerRequest { question })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!("answer service after {:?}", self.timeout))
                } else {
                    Error::Answer(format!("Answer service request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Answer(format!(
                "Answer service error {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let answer: Answer = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("Failed to parse answer: {}", e)))?;

        tracing::info!(
            passages = answer.supporting_passages.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Answer service responded"
        );

        Ok(answer)
    }

    fn name(&self) -> &str {
        "remote-answer-service"
    }
}
