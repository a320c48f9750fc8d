//! HTTP client wrapper with status checking and read retries.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::error::{CloudError, Result};

/// Connection tuning for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Per-request timeout (default 30 s).
    pub request_timeout: Duration,
    /// Maximum retries for reads on transient failures (default 3).
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each attempt (default 100 ms).
    pub base_backoff: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            base_backoff: Duration::from_millis(100),
        }
    }
}

/// HTTP client for the store's REST endpoint.
pub struct HttpClient {
    client: Client,
    options: HttpOptions,
}

impl HttpClient {
    /// Create a client without default headers.
    pub fn new(options: HttpOptions) -> Result<Self> {
        Self::with_headers(options, HeaderMap::new())
    }

    /// Create a client that sends the store's `apikey` and bearer token on
    /// every request.
    pub fn with_api_key(options: HttpOptions, api_key: &str) -> Result<Self> {
        let key = HeaderValue::from_str(api_key)
            .map_err(|e| CloudError::Config(format!("invalid API key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| CloudError::Config(format!("invalid API key: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self::with_headers(options, headers)
    }

    fn with_headers(options: HttpOptions, headers: HeaderMap) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| CloudError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, options })
    }

    /// The underlying reqwest client, for building requests.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn options(&self) -> &HttpOptions {
        &self.options
    }

    /// Send a read request, retrying transient failures with exponential
    /// backoff. The request must be cloneable (no streaming body).
    pub async fn read(&self, request: RequestBuilder) -> Result<Response> {
        let mut attempt = 0;
        loop {
            let Some(cloned) = request.try_clone() else {
                return self.send(request).await;
            };
            match self.send(cloned).await {
                Err(e) if e.is_transient() && attempt < self.options.max_retries => {
                    let backoff = self.options.base_backoff * 2u32.pow(attempt);
                    attempt += 1;
                    debug!("Read failed ({e}), retry {attempt} in {:?}", backoff);
                    tokio::time::sleep(backoff).await;
                }
                other => return other,
            }
        }
    }

    /// Send a write request once.
    pub async fn write(&self, request: RequestBuilder) -> Result<Response> {
        self.send(request).await
    }

    /// Read a response body as text.
    pub async fn read_text(&self, request: RequestBuilder) -> Result<String> {
        let resp = self.read(request).await?;
        Ok(resp.text().await?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(CloudError::Status {
            code: status.as_u16(),
            body: body.chars().take(500).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_headers() {
        assert!(HttpClient::with_api_key(HttpOptions::default(), "anon-key").is_ok());
        assert!(matches!(
            HttpClient::with_api_key(HttpOptions::default(), "bad\nkey"),
            Err(CloudError::Config(_))
        ));
    }

    #[test]
    fn test_transient_classification() {
        assert!(CloudError::Status { code: 503, body: String::new() }.is_transient());
        assert!(!CloudError::Status { code: 404, body: String::new() }.is_transient());
        assert!(!CloudError::Decode("x".into()).is_transient());
    }
}
