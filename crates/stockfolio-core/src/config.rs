//! Static provider configuration with environment overrides.

use std::time::Duration;

use crate::retry::RetryConfig;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_API_KEY: &str = "demo";
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 5;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_API_KEY: &str = "STOCKFOLIO_API_KEY";
pub const ENV_BASE_URL: &str = "STOCKFOLIO_BASE_URL";
pub const ENV_REQUESTS_PER_MINUTE: &str = "STOCKFOLIO_REQUESTS_PER_MINUTE";
pub const ENV_CACHE_TTL_SECS: &str = "STOCKFOLIO_CACHE_TTL_SECS";

/// Everything the API client needs to reach the provider.
#[derive(Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub requests_per_minute: u32,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            api_key: String::from(DEFAULT_API_KEY),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by `STOCKFOLIO_*` environment variables.
    ///
    /// Unparseable numeric values keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(api_key) = lookup(ENV_API_KEY).filter(|value| !value.trim().is_empty()) {
            config.api_key = api_key.trim().to_owned();
        }
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            config.base_url = base_url.trim().to_owned();
        }
        if let Some(quota) = lookup(ENV_REQUESTS_PER_MINUTE).and_then(|v| v.trim().parse().ok()) {
            config.requests_per_minute = quota;
        }
        if let Some(secs) = lookup(ENV_CACHE_TTL_SECS).and_then(|v| v.trim().parse().ok()) {
            config.cache_ttl = Duration::from_secs(secs);
        }

        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_requests_per_minute(mut self, requests_per_minute: u32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

// Never prints the API key.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("requests_per_minute", &self.requests_per_minute)
            .field("cache_ttl", &self.cache_ttl)
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
