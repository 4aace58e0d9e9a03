//! Provider access: cache lookup, rate limiting, retry and error normalization.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::{CacheMode, ResponseCache};
use crate::classify::{classify, provider_marker, Failure};
use crate::config::ApiConfig;
use crate::endpoint::{fingerprint, Endpoint, QueryParams};
use crate::error::{StockError, UNEXPECTED_MESSAGE};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::rate_limiter::RateLimiter;
use crate::retry::with_retry;

const RESERVED_PARAMS: [&str; 2] = ["function", "apikey"];

/// Raw-payload client for the quote provider.
///
/// Clones share the transport, the rate limiter and the response cache.
#[derive(Clone)]
pub struct ApiClient {
    http_client: Arc<dyn HttpClient>,
    rate_limiter: Arc<RateLimiter>,
    cache: ResponseCache,
    config: Arc<ApiConfig>,
    cancel: CancellationToken,
}

impl ApiClient {
    /// Client with a reqwest transport and its own limiter and cache.
    pub fn new(config: ApiConfig) -> Self {
        ApiClientBuilder::new(config).build()
    }

    pub fn builder(config: ApiConfig) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    /// A client sharing this one's state whose requests stop once `cancel`
    /// is cancelled.
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            cancel,
            ..self.clone()
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fetches the raw payload for `endpoint`.
    ///
    /// A cache hit returns immediately without touching the rate limiter.
    /// Otherwise every attempt waits on the shared limiter, and only
    /// successful payloads are cached.
    pub async fn request(
        &self,
        endpoint: Endpoint,
        params: &QueryParams,
        mode: CacheMode,
    ) -> Result<Value, StockError> {
        self.request_with_default(endpoint, params, mode, UNEXPECTED_MESSAGE)
            .await
    }

    /// Like [`request`](Self::request), reporting unclassifiable failures
    /// with `default_message`.
    pub async fn request_with_default(
        &self,
        endpoint: Endpoint,
        params: &QueryParams,
        mode: CacheMode,
        default_message: &str,
    ) -> Result<Value, StockError> {
        let key = fingerprint(endpoint, params);

        if mode.reads() {
            if let Some(payload) = self.cache.get(&key).await {
                debug!(%endpoint, ?params, "response cache hit");
                return Ok(payload);
            }
            debug!(%endpoint, ?params, "response cache miss");
        }

        let payload = with_retry(&self.config.retry, &self.cancel, || {
            self.attempt(endpoint, params, default_message)
        })
        .await?;

        if self.cancel.is_cancelled() {
            return Err(StockError::cancelled());
        }
        if mode.writes() {
            self.cache.set(key, payload.clone()).await;
        }

        Ok(payload)
    }

    async fn attempt(
        &self,
        endpoint: Endpoint,
        params: &QueryParams,
        default_message: &str,
    ) -> Result<Value, StockError> {
        tokio::select! {
            _ = self.cancel.cancelled() => return Err(StockError::cancelled()),
            _ = self.rate_limiter.enforce() => {}
        }

        debug!(%endpoint, ?params, "issuing provider request");
        let request = self.build_request(endpoint, params);
        let response = tokio::select! {
            _ = self.cancel.cancelled() => return Err(StockError::cancelled()),
            response = self.http_client.execute(request) => response,
        };

        let response = response.map_err(|error| classify(error, default_message))?;
        decode_response(response, default_message)
    }

    fn build_request(&self, endpoint: Endpoint, params: &QueryParams) -> HttpRequest {
        let mut request = HttpRequest::get(&self.config.base_url)
            .with_timeout(self.config.request_timeout)
            .with_query("function", endpoint.function())
            .with_query("apikey", &self.config.api_key);

        for (name, value) in params.iter() {
            if !RESERVED_PARAMS.contains(&name) {
                request = request.with_query(name, value);
            }
        }

        request
    }
}

/// Builds an [`ApiClient`], optionally sharing an existing limiter or cache.
pub struct ApiClientBuilder {
    config: ApiConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    rate_limiter: Option<Arc<RateLimiter>>,
    cache: Option<ResponseCache>,
    cancel: CancellationToken,
}

impl ApiClientBuilder {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http_client: None,
            rate_limiter: None,
            cache: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn build(self) -> ApiClient {
        let rate_limiter = self
            .rate_limiter
            .unwrap_or_else(|| Arc::new(RateLimiter::new(self.config.requests_per_minute)));
        let cache = self
            .cache
            .unwrap_or_else(|| ResponseCache::new(self.config.cache_ttl));
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));

        ApiClient {
            http_client,
            rate_limiter,
            cache,
            config: Arc::new(self.config),
            cancel: self.cancel,
        }
    }
}

fn decode_response(response: HttpResponse, default_message: &str) -> Result<Value, StockError> {
    if !response.is_success() {
        return Err(classify(
            Failure::Status {
                status: response.status,
                body: response.body,
            },
            default_message,
        ));
    }

    let payload: Value =
        serde_json::from_str(&response.body).map_err(|error| classify(error, default_message))?;

    match provider_marker(&payload) {
        Some(error) => Err(error),
        None => Ok(payload),
    }
}
