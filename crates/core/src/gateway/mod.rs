//! Clients for the scraping gateway and the Bilibili proxy API.

pub mod aweme;
pub mod bilibili;
pub mod deepl;
pub mod ideogram;
pub mod retry;
pub mod transcript;
pub mod xiaohongshu;
pub mod youtube;

use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

pub use retry::RetryPolicy;

use crate::{config::Config, error::PlatformError};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("API URL not configured")]
    MissingApiUrl,

    #[error("Missing API key")]
    MissingApiKey,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl GatewayError {
    pub fn into_platform(self, platform: impl fmt::Display) -> PlatformError {
        let code = match &self {
            GatewayError::Status { status, .. } => Some(i64::from(*status)),
            _ => None,
        };
        let err = PlatformError::new(platform, self.to_string());
        match code {
            Some(code) => err.with_code(code),
            None => err,
        }
    }
}

/// `code` is 0 or 200 on gateway success.
pub(crate) fn code_ok(value: &Value) -> bool {
    matches!(value["code"].as_i64(), Some(0) | Some(200))
}

pub(crate) fn response_code(value: &Value) -> Option<i64> {
    value["code"].as_i64()
}

#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    api_url: Option<String>,
    api_key: Option<String>,
    bilibili_api_url: Option<String>,
    retry: RetryPolicy,
}

impl GatewayClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone().map(|u| u.trim_end_matches('/').to_string()),
            api_key: config.api_key.clone(),
            bilibili_api_url: config
                .bilibili_api_url
                .clone()
                .map(|u| u.trim_end_matches('/').to_string()),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn gateway_url(&self, path: &str) -> Result<String, GatewayError> {
        let base = self.api_url.as_deref().ok_or(GatewayError::MissingApiUrl)?;
        Ok(format!("{base}/{}", path.trim_start_matches('/')))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_ok()
    }

    fn api_key(&self) -> Result<&str, GatewayError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GatewayError::MissingApiKey)
    }

    /// Authenticated GET against the scraping gateway.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, GatewayError> {
        let url = self.gateway_url(path)?;
        let key = self.api_key()?;
        self.send_json(&self.retry, || {
            self.http.get(&url).query(query).bearer_auth(key)
        })
        .await
    }

    /// Authenticated POST against the scraping gateway. Not retried.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, GatewayError> {
        let url = self.gateway_url(path)?;
        let key = self.api_key()?;
        let policy = RetryPolicy {
            timeout: std::time::Duration::from_secs(60),
            ..RetryPolicy::once()
        };
        self.send_json(&policy, || self.http.post(&url).bearer_auth(key).json(body))
            .await
    }

    /// Unauthenticated GET against the Bilibili proxy API.
    pub async fn get_bilibili(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, GatewayError> {
        let base = self
            .bilibili_api_url
            .as_deref()
            .ok_or(GatewayError::MissingApiUrl)?;
        let url = format!("{base}/{}", path.trim_start_matches('/'));
        self.send_json(&self.retry, || self.http.get(&url).query(query))
            .await
    }

    async fn send_json(
        &self,
        policy: &RetryPolicy,
        make: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<Value, GatewayError> {
        let mut attempt = 0;
        loop {
            let result = make().timeout(policy.timeout).send().await;

            let retryable = match &result {
                Ok(response) => policy.retries_status(response.status().as_u16()),
                Err(e) => e.is_timeout() || e.is_connect(),
            };
            if retryable && attempt < policy.limit {
                attempt += 1;
                let delay = policy.delay(attempt);
                match &result {
                    Ok(response) => debug!(status = %response.status(), ?delay, attempt, "retrying gateway request"),
                    Err(e) => debug!(error = %e, ?delay, attempt, "retrying gateway request"),
                }
                tokio::time::sleep(delay).await;
                continue;
            }

            let response = result?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!(%status, "gateway request failed");
                return Err(GatewayError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            return Ok(response.json::<Value>().await?);
        }
    }
}
