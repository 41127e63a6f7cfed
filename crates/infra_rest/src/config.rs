//! Resource client configuration

use serde::Deserialize;
use std::time::Duration;

/// Default backend location, used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Configuration for the backend REST client
///
/// # Example
///
/// ```rust
/// use infra_rest::RestClientConfig;
///
/// let config = RestClientConfig::new("https://backend.internal/api/v1")
///     .with_api_key("secret")
///     .with_retries(2, 50);
/// assert_eq!(config.max_retries, 2);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RestClientConfig {
    /// Base URL every resource path is appended to
    pub base_url: String,

    /// Optional API key sent in `api_key_header`
    pub api_key: Option<String>,

    /// Header carrying the API key
    pub api_key_header: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retries for idempotent reads failing transiently
    pub max_retries: u32,

    /// Initial backoff, doubled on every retry
    pub retry_delay_ms: u64,

    /// Path probed by the readiness check
    pub health_path: String,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_header: "X-API-Key".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 200,
            health_path: "/products".to_string(),
        }
    }
}

impl RestClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff before retry number `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_delay_ms.saturating_mul(1u64 << attempt.min(16)))
    }

    /// Joins the base URL and a resource path
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
