//! # Stockfolio Core
//!
//! Rate-limited, cached and retrying access to the Alpha Vantage quote API,
//! plus the portfolio bookkeeping built on top of it.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | TTL response cache and per-request cache modes |
//! | [`classify`] | Failure normalization into [`StockError`] |
//! | [`client`] | Raw-payload [`ApiClient`] |
//! | [`config`] | [`ApiConfig`] defaults and environment overrides |
//! | [`domain`] | Quote, daily-close and search-match records |
//! | [`endpoint`] | Provider operations, parameters and cache fingerprints |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`indicators`] | Moving averages for trend views |
//! | [`portfolio`] | JSON-file portfolio store |
//! | [`rate_limiter`] | Shared minimum-spacing limiter |
//! | [`retry`] | Bounded retry with exponential backoff |
//! | [`stock_data`] | Typed [`StockDataMapper`] operations |
//!
//! ## Request flow
//!
//! ```text
//! StockDataMapper ──▶ ApiClient ──▶ ResponseCache (hit: return)
//!                         │
//!                         ▼ miss
//!                     with_retry ──▶ RateLimiter::enforce ──▶ HttpClient
//!                         │
//!                         ▼
//!                     classify / provider_marker ──▶ StockError
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stockfolio_core::{ApiClient, ApiConfig, StockDataMapper};
//!
//! # async fn run() -> Result<(), stockfolio_core::StockError> {
//! let mapper = StockDataMapper::new(ApiClient::new(ApiConfig::from_env()));
//! let quote = mapper.fetch_quote("AAPL").await?;
//! println!("{} {:.2}", quote.symbol, quote.current_price);
//! # Ok(())
//! # }
//! ```
//!
//! ## Security
//!
//! The API key is sent as a query parameter only; it is excluded from cache
//! keys, `Debug` output and log fields.

pub mod cache;
pub mod classify;
pub mod client;
pub mod config;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod http_client;
pub mod indicators;
pub mod portfolio;
pub mod rate_limiter;
pub mod retry;
pub mod stock_data;

pub use cache::{CacheMode, ResponseCache};
pub use classify::{classify, provider_marker, Failure};
pub use client::{ApiClient, ApiClientBuilder};
pub use config::ApiConfig;
pub use domain::{HistoricalData, Stock, StockSymbol, Symbol};
pub use endpoint::{fingerprint, Endpoint, QueryParams};
pub use error::{PortfolioError, StockError, StockErrorKind, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use indicators::{moving_average, with_moving_averages, TrendPoint};
pub use portfolio::{
    default_portfolio_path, PortfolioStock, PortfolioStore, PortfolioSummary, RefreshFailure,
    RefreshReport,
};
pub use rate_limiter::RateLimiter;
pub use retry::{with_retry, RetryConfig, RetryState};
pub use stock_data::{StockDataMapper, DEFAULT_HISTORY_DAYS};
