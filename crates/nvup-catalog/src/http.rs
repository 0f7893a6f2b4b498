//! HTTP backend abstraction for the catalog service.
//!
//! A trait-based backend allows dependency injection for tests; the
//! production implementation uses reqwest with automatic retry for
//! transient server errors.

use std::time::Duration;

use async_trait::async_trait;
use nvup_core::CatalogError;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::CatalogClientConfig;

/// Trait for HTTP backends that can fetch JSON from URLs.
///
/// This is an implementation detail - external code should use the
/// `CatalogClient` port.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Fetch JSON from a URL and deserialize it.
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> Result<T, CatalogError>;
}

/// Production HTTP backend using reqwest with retry logic.
///
/// Implements exponential backoff for transient server errors (5xx)
/// and network errors. Client errors (4xx) fail immediately.
pub struct ReqwestBackend {
    client: reqwest::Client,
    timeout_secs: u64,
    max_retries: u8,
    retry_base_delay_ms: u64,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &CatalogClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            timeout_secs: config.timeout.as_secs(),
            max_retries: config.max_retries,
            #[allow(clippy::cast_possible_truncation)] // backoff delays stay far below u64::MAX ms
            retry_base_delay_ms: config.retry_base_delay.as_millis() as u64,
        }
    }

    /// Map a reqwest error onto the catalog error taxonomy.
    fn map_error(&self, err: &reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            CatalogError::Timeout {
                seconds: self.timeout_secs,
            }
        } else {
            CatalogError::network(err.to_string())
        }
    }

    /// Fetch a URL with automatic retry for transient errors.
    async fn fetch_with_retry(&self, url: &Url) -> Result<reqwest::Response, CatalogError> {
        let mut last_error: Option<CatalogError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(
                    self.retry_base_delay_ms * 2u64.pow(u32::from(attempt) - 1),
                );
                tracing::debug!(
                    target: "nvup.catalog",
                    attempt,
                    delay = ?delay,
                    "retrying catalog request"
                );
                tokio::time::sleep(delay).await;
            }

            match self.client.get(url.as_str()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    // 5xx errors are retryable (server-side issues)
                    if status.is_server_error() && attempt < self.max_retries {
                        last_error = Some(CatalogError::network_with_status(
                            format!("catalog responded with {status}"),
                            status.as_u16(),
                        ));
                        continue;
                    }

                    // 4xx errors or final attempt - fail immediately
                    return Err(CatalogError::network_with_status(
                        format!("catalog responded with {status}"),
                        status.as_u16(),
                    ));
                }
                Err(err) => {
                    // Network errors are retryable, timeouts are not
                    let mapped = self.map_error(&err);
                    if matches!(mapped, CatalogError::Timeout { .. })
                        || attempt >= self.max_retries
                    {
                        return Err(mapped);
                    }
                    last_error = Some(mapped);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| CatalogError::network("unknown error during catalog fetch")))
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> Result<T, CatalogError> {
        let response = self.fetch_with_retry(url).await?;
        let text = response
            .text()
            .await
            .map_err(|err| self.map_error(&err))?;
        serde_json::from_str(&text)
            .map_err(|err| CatalogError::malformed(format!("invalid catalog JSON: {err}")))
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// A fake HTTP backend that returns canned responses keyed by URL
    /// substring.
    pub struct FakeBackend {
        responses: Mutex<HashMap<String, serde_json::Value>>,
        failure: Option<CatalogError>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                failure: None,
            }
        }

        /// Add a canned response for a URL pattern.
        pub fn with_response(self, url_contains: &str, json: serde_json::Value) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url_contains.to_string(), json);
            self
        }

        /// Make every request fail with the given error.
        pub fn failing_with(error: CatalogError) -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                failure: Some(error),
            }
        }
    }

    impl Default for FakeBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn get_json<T: DeserializeOwned + Send>(
            &self,
            url: &Url,
        ) -> Result<T, CatalogError> {
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }
            let json = {
                let responses = self.responses.lock().unwrap();
                responses
                    .iter()
                    .find(|(pattern, _)| url.as_str().contains(pattern.as_str()))
                    .map(|(_, json)| json.clone())
            };
            let json = json.ok_or_else(|| {
                CatalogError::network_with_status(format!("no canned response for {url}"), 404)
            })?;
            serde_json::from_value(json)
                .map_err(|err| CatalogError::malformed(format!("invalid catalog JSON: {err}")))
        }
    }
}
