use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::HttpError;
use crate::retry::{with_retry, RetryPolicy};

/// Connection settings for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            user_agent: format!("nimbus/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn from_config(config: &nimbus_core::Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.api.timeout_secs),
            retry: RetryPolicy::from(&config.retry),
            ..Self::default()
        }
    }
}

/// JSON GET client with retry.
///
/// Cheap to clone; clones share the underlying connection pool and nothing
/// else, so concurrent requests are independent.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            retry: config.retry.clone(),
        })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// GET `url` and decode the JSON body, using the configured attempt budget.
    pub async fn request<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        self.request_with_attempts(url, self.retry.max_attempts).await
    }

    /// GET `url` with an explicit attempt budget.
    pub async fn request_with_attempts<T: DeserializeOwned>(
        &self,
        url: &str,
        max_attempts: u32,
    ) -> Result<T, HttpError> {
        let policy = self.retry.with_max_attempts(max_attempts);
        with_retry(&policy, || self.send_once(url)).await
    }

    async fn send_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        // Transport errors drop the URL; it carries the API key.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.without_url()))?;
        let status = response.status();

        if !status.is_success() {
            let body = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!("Could not read error body: {}", e);
                    String::new()
                }
            };
            return Err(HttpError::status(status.as_u16(), body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HttpError::Transport(e.without_url()))?;
        serde_json::from_slice(&bytes).map_err(|e| HttpError::Decode(e.to_string()))
    }
}
