mod history;
mod portfolio;
mod quote;
mod search;
mod trend;

use serde::Serialize;
use serde_json::Value;
use stockfolio_core::{ApiClient, ApiConfig, CacheMode, StockDataMapper, StockError};
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub errors: Vec<ErrorReport>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<ErrorReport>) -> Self {
        self.errors.extend(errors);
        self
    }
}

/// A per-item failure reported next to the successful results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub code: &'static str,
    pub message: String,
}

impl ErrorReport {
    pub fn for_symbol(symbol: impl Into<String>, error: &StockError) -> Self {
        Self {
            symbol: Some(symbol.into()),
            code: error.code(),
            message: error.message().to_owned(),
        }
    }
}

pub async fn run(cli: &Cli, cancel: &CancellationToken) -> Result<CommandResult, CliError> {
    let mapper = StockDataMapper::new(ApiClient::new(api_config(cli)))
        .with_cache_mode(cache_mode(cli))
        .with_cancellation(cancel.clone());

    match &cli.command {
        Command::Quote(args) => quote::run(args, &mapper).await,
        Command::Search(args) => search::run(args, &mapper).await,
        Command::History(args) => history::run(args, &mapper).await,
        Command::Trend(args) => trend::run(args, &mapper).await,
        Command::Portfolio(args) => portfolio::run(args, cli.portfolio.as_deref(), &mapper).await,
    }
}

/// Environment configuration with command-line overrides applied.
pub fn api_config(cli: &Cli) -> ApiConfig {
    let mut config = ApiConfig::from_env();
    if let Some(api_key) = cli.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty()) {
        config = config.with_api_key(api_key);
    }
    if let Some(quota) = cli.requests_per_minute {
        config = config.with_requests_per_minute(quota);
    }
    config
}

fn cache_mode(cli: &Cli) -> CacheMode {
    if cli.no_cache {
        CacheMode::Refresh
    } else {
        CacheMode::Use
    }
}
