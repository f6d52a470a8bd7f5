//! Bounded retry with fixed backoff

use std::future::Future;
use std::time::Duration;

use agri_voice_core::{Error, Result};

/// Retry transient failures a fixed number of times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Pause before each retry
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Run `operation`, retrying errors for which [`Error::is_transient`] holds
    ///
    /// The closure receives the attempt number (0 for the first try).
    /// Non-transient errors are returned immediately.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    operation = label,
                    attempt,
                    max_retries = self.max_retries,
                    backoff_ms = self.backoff.as_millis() as u64,
                    error = ?last_error,
                    "Request failed, retrying"
                );
                tokio::time::sleep(self.backoff).await;
            }

            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Network("Max retries exceeded".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(2, Duration::from_millis(1));

        let result = policy
            .run("test", move |_| async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(Error::Endpoint {
                        status: 503,
                        body: "busy".into(),
                    })
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(1, Duration::from_millis(1));

        let result: Result<()> = policy
            .run("test", move |_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Timeout("slow".into()))
            })
            .await;

        assert!(matches!(result, Err(Error::Timeout(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_errors_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result: Result<()> = policy
            .run("test", move |_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Endpoint {
                    status: 400,
                    body: "bad request".into(),
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
