//! Authenticated HTTP client for the speech API
//!
//! The API has been deployed behind different authentication header layouts.
//! [`ApiClient::connect`] probes the configured schemes once and returns a
//! client bound to the first one the server accepts. The result is immutable
//! and cheap to clone; every STT, translation and TTS request goes through it.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use agri_voice_config::constants::endpoints;
use agri_voice_config::{AuthScheme, SpeechApiConfig};

use crate::{truncate_body, TransportError};

/// HTTP client bound to one base URL, key and authentication scheme
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    scheme: AuthScheme,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client with a known scheme, skipping the probe
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        scheme: AuthScheme,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| {
                TransportError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            scheme,
        })
    }

    /// Build a client and settle the authentication scheme
    ///
    /// Candidates are tried in configured order with a minimal translation
    /// request. The first scheme answered with anything other than 401/403
    /// wins. A network failure during the probe aborts with
    /// [`TransportError::Configuration`]; rejection of every scheme yields
    /// [`TransportError::Auth`].
    pub async fn connect(config: &SpeechApiConfig) -> Result<Self, TransportError> {
        let api_key = config.api_key().ok_or(TransportError::MissingApiKey)?;
        let first = *config
            .auth_schemes
            .first()
            .ok_or_else(|| TransportError::Configuration("no auth schemes configured".into()))?;

        let mut client = Self::new(&config.base_url, api_key, first)?;
        if !config.probe_on_startup {
            tracing::info!(scheme = %first, "Auth probe disabled, using first configured scheme");
            return Ok(client);
        }

        let mut rejected = Vec::new();
        for scheme in &config.auth_schemes {
            client.scheme = *scheme;
            match client.probe(config.probe_timeout()).await {
                Ok(status) if is_auth_rejection(status) => {
                    tracing::debug!(scheme = %scheme, status = status.as_u16(), "Auth scheme rejected");
                    rejected.push(scheme.as_str());
                }
                Ok(status) => {
                    tracing::info!(
                        scheme = %scheme,
                        status = status.as_u16(),
                        base_url = %client.base_url,
                        "Speech API authentication settled"
                    );
                    return Ok(client);
                }
                Err(e) => {
                    return Err(TransportError::Configuration(format!(
                        "Auth probe against {} failed: {}",
                        client.base_url, e
                    )));
                }
            }
        }

        tracing::error!(tried = ?rejected, "Speech API rejected every authentication scheme");
        Err(TransportError::Auth(rejected.join(", ")))
    }

    async fn probe(&self, timeout: Duration) -> Result<StatusCode, TransportError> {
        let body = serde_json::json!({
            "input": "ok",
            "source_language_code": "en-IN",
            "target_language_code": "hi-IN",
        });
        let response = self
            .authorize(self.http.post(self.url(endpoints::TRANSLATE_PATH)))
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;
        Ok(response.status())
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.scheme {
            AuthScheme::SubscriptionKey => request.header("api-subscription-key", &self.api_key),
            AuthScheme::Bearer => request.bearer_auth(&self.api_key),
            AuthScheme::ApiKey => request.header("x-api-key", &self.api_key),
        }
    }

    /// POST a JSON body and decode a JSON response
    pub async fn post_json<B, R>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<R, TransportError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .authorize(self.http.post(self.url(path)))
            .timeout(timeout)
            .json(body)
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// POST a multipart form and decode a JSON response
    pub async fn post_multipart<R>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        timeout: Duration,
    ) -> Result<R, TransportError>
    where
        R: DeserializeOwned,
    {
        let response = self
            .authorize(self.http.post(self.url(path)))
            .timeout(timeout)
            .multipart(form)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn read_json<R: DeserializeOwned>(response: Response) -> Result<R, TransportError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            TransportError::InvalidResponse(format!("{} (body: {})", e, truncate_body(&body)))
        })
    }
}

fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("https://api.example.com/", "k", AuthScheme::Bearer).unwrap();
        assert_eq!(client.url("/translate"), "https://api.example.com/translate");
        assert_eq!(client.url("text-to-speech"), "https://api.example.com/text-to-speech");
    }

    #[test]
    fn test_debug_hides_key() {
        let client = ApiClient::new("https://api.example.com", "secret-key", AuthScheme::ApiKey)
            .unwrap();
        assert!(!format!("{:?}", client).contains("secret-key"));
    }

    #[tokio::test]
    async fn test_connect_without_key() {
        let config = SpeechApiConfig {
            api_key: None,
            ..SpeechApiConfig::default()
        };
        assert!(matches!(
            ApiClient::connect(&config).await,
            Err(TransportError::MissingApiKey)
        ));
    }
}
