use async_trait::async_trait;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{RetryConfig, ScraperConfig};
use crate::error::{FetchError, Result, ScraperError};

/// Source of raw page markup
#[async_trait]
pub trait MarkupFetcher: Send + Sync {
    /// Fetch the document at `url` as text
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Fetches pages over HTTP(S) with a shared connection pool
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher from the run configuration
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.source.user_agent.as_str())
            .build()
            .map_err(|e| ScraperError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl MarkupFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let body = response.text().await.map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

/// A page that could not be loaded but did not stop the run
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    /// Team or player the page belongs to
    pub subject: String,
    pub error: FetchError,
}

/// Exponential backoff policy for retryable fetch failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, given that `attempt` (1-based) just failed
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let millis = (self.initial_delay.as_millis() as f64 * factor)
            .min(self.max_delay.as_millis() as f64);
        Duration::from_millis(millis as u64)
    }

    /// Run `f` until it succeeds, fails with a non-retryable error, or attempts run out
    pub async fn run<F, Fut, T>(&self, mut f: F) -> std::result::Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, FetchError>>,
    {
        let mut attempt = 1;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_after(attempt);
                    warn!("Attempt {} failed: {}, retrying in {:?}", attempt, e, delay);
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
        }
    }
}

/// Wraps another fetcher with a retry policy
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: MarkupFetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<F: MarkupFetcher> MarkupFetcher for RetryingFetcher<F> {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        self.policy.run(|| self.inner.fetch(url)).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned pages; unknown URLs answer 404
    #[derive(Default)]
    pub struct StaticFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MarkupFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status { url: url.to_string(), status: 404 })
        }
    }

    /// Fails the first `failures` calls with a 503, then serves `body`
    pub struct FlakyFetcher {
        pub failures: u32,
        pub body: String,
        pub calls: Mutex<u32>,
    }

    #[async_trait]
    impl MarkupFetcher for FlakyFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls <= self.failures {
                return Err(FetchError::Status { url: url.to_string(), status: 503 });
            }
            Ok(self.body.clone())
        }
    }
}
