//! Typed stock data on top of the raw [`ApiClient`].
//!
//! Provider payloads are parsed leniently: numeric fields may arrive as strings
//! or numbers, and anything that does not parse becomes `0`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::CacheMode;
use crate::classify::{classify, Failure};
use crate::client::ApiClient;
use crate::domain::{parse_trading_day, HistoricalData, Stock, StockSymbol, Symbol};
use crate::endpoint::{Endpoint, QueryParams};
use crate::error::{StockError, ValidationError};

pub const QUOTE_FAILED_MESSAGE: &str = "Failed to fetch stock data";
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to search stock symbols";
pub const HISTORY_FAILED_MESSAGE: &str = "Failed to fetch historical data";

/// Window used when the caller does not ask for a specific number of days.
pub const DEFAULT_HISTORY_DAYS: usize = 7;

/// Rows the provider returns for `outputsize=compact`.
const COMPACT_SERIES_LEN: usize = 100;

const QUOTE_KEY: &str = "Global Quote";
const SEARCH_KEY: &str = "bestMatches";
const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

/// Maps quote, search and daily-series payloads into domain records.
#[derive(Clone)]
pub struct StockDataMapper {
    client: ApiClient,
    cache_mode: CacheMode,
}

impl StockDataMapper {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            cache_mode: CacheMode::Use,
        }
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    /// A mapper whose requests stop once `cancel` is cancelled.
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            client: self.client.with_cancellation(cancel),
            cache_mode: self.cache_mode,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }

    /// Latest quote for `symbol`.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Stock, StockError> {
        let symbol = Symbol::parse(symbol)?;
        let params = QueryParams::new().with("symbol", symbol.as_str());

        let payload = self
            .client
            .request_with_default(Endpoint::Quote, &params, self.cache_mode, QUOTE_FAILED_MESSAGE)
            .await?;

        map_quote(&symbol, &payload)
    }

    /// Symbol matches for `keywords`. Blank keywords return nothing without a
    /// provider call.
    pub async fn search_symbols(&self, keywords: &str) -> Result<Vec<StockSymbol>, StockError> {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let params = QueryParams::new().with("keywords", keywords);
        let payload = self
            .client
            .request_with_default(Endpoint::Search, &params, self.cache_mode, SEARCH_FAILED_MESSAGE)
            .await?;

        Ok(map_search(&payload))
    }

    /// The `days` most recent daily closes for `symbol`, newest first.
    pub async fn fetch_historical(
        &self,
        symbol: &str,
        days: usize,
    ) -> Result<Vec<HistoricalData>, StockError> {
        let symbol = Symbol::parse(symbol)?;
        if days == 0 {
            return Err(ValidationError::ZeroDays.into());
        }

        let output_size = if days > COMPACT_SERIES_LEN {
            "full"
        } else {
            "compact"
        };
        let params = QueryParams::new()
            .with("symbol", symbol.as_str())
            .with("outputsize", output_size);

        let payload = self
            .client
            .request_with_default(
                Endpoint::DailySeries,
                &params,
                self.cache_mode,
                HISTORY_FAILED_MESSAGE,
            )
            .await?;

        map_daily_series(&symbol, &payload, days)
    }
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol", default, deserialize_with = "lenient_string")]
    symbol: String,
    #[serde(rename = "05. price", default, deserialize_with = "lenient_price")]
    price: f64,
    #[serde(rename = "06. volume", default, deserialize_with = "lenient_volume")]
    volume: u64,
    #[serde(rename = "08. previous close", default, deserialize_with = "lenient_price")]
    previous_close: f64,
    #[serde(rename = "09. change", default, deserialize_with = "lenient_f64")]
    change: f64,
    #[serde(rename = "10. change percent", default, deserialize_with = "lenient_percent")]
    change_percent: f64,
}

#[derive(Debug, Deserialize)]
struct SearchMatch {
    #[serde(rename = "1. symbol", default, deserialize_with = "lenient_string")]
    symbol: String,
    #[serde(rename = "2. name", default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(rename = "3. type", default, deserialize_with = "lenient_string")]
    match_type: String,
    #[serde(rename = "4. region", default, deserialize_with = "lenient_string")]
    region: String,
    #[serde(rename = "8. currency", default, deserialize_with = "lenient_string")]
    currency: String,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close", default, deserialize_with = "lenient_price")]
    close: f64,
}

fn map_quote(symbol: &Symbol, payload: &Value) -> Result<Stock, StockError> {
    if !payload.is_object() {
        return Err(classify(Failure::Payload(payload.clone()), QUOTE_FAILED_MESSAGE));
    }

    let raw = payload
        .get(QUOTE_KEY)
        .filter(|quote| quote.as_object().is_some_and(|fields| !fields.is_empty()))
        .ok_or_else(|| {
            StockError::not_found(format!(
                "No data found for symbol {symbol}. Please check and try again."
            ))
        })?;

    let quote =
        GlobalQuote::deserialize(raw).map_err(|error| classify(error, QUOTE_FAILED_MESSAGE))?;

    let reported = quote.symbol.trim().to_ascii_uppercase();
    Ok(Stock {
        symbol: if reported.is_empty() {
            symbol.to_string()
        } else {
            reported
        },
        current_price: quote.price,
        previous_close: quote.previous_close,
        change: quote.change,
        change_percent: quote.change_percent,
        volume: quote.volume,
    })
}

fn map_search(payload: &Value) -> Vec<StockSymbol> {
    let Some(matches) = payload.get(SEARCH_KEY).and_then(Value::as_array) else {
        debug!("search payload has no matches");
        return Vec::new();
    };

    matches
        .iter()
        .filter_map(|raw| match SearchMatch::deserialize(raw) {
            Ok(found) => Some(StockSymbol {
                symbol: found.symbol,
                name: found.name,
                asset_type: found.match_type,
                region: found.region,
                currency: found.currency,
            }),
            Err(error) => {
                warn!(%error, "skipping malformed search match");
                None
            }
        })
        .collect()
}

fn map_daily_series(
    symbol: &Symbol,
    payload: &Value,
    days: usize,
) -> Result<Vec<HistoricalData>, StockError> {
    if !payload.is_object() {
        return Err(classify(Failure::Payload(payload.clone()), HISTORY_FAILED_MESSAGE));
    }

    let not_found = || StockError::not_found(format!("No historical data available for {symbol}."));

    let series = payload
        .get(DAILY_SERIES_KEY)
        .and_then(Value::as_object)
        .filter(|rows| !rows.is_empty())
        .ok_or_else(not_found)?;

    let mut points = Vec::with_capacity(series.len());
    for (day, row) in series {
        let Some(date) = parse_trading_day(day) else {
            warn!(%symbol, row = %day, "skipping series row with invalid date");
            continue;
        };
        let price = DailyBar::deserialize(row).map_or(0.0, |bar| bar.close);
        points.push(HistoricalData::new(date, price));
    }

    if points.is_empty() {
        return Err(not_found());
    }

    points.sort_by(|a, b| b.date.cmp(&a.date));
    points.truncate(days);
    Ok(points)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_from(&Value::deserialize(deserializer)?, false))
}

fn lenient_percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_from(&Value::deserialize(deserializer)?, true))
}

fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.max(0.0))
}

fn lenient_volume<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Some(volume) = value.as_u64() {
        return Ok(volume);
    }
    let volume = number_from(&value, false);
    Ok(if volume > 0.0 { volume as u64 } else { 0 })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

fn number_from(value: &Value, percent: bool) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let text = text.trim();
            let text = if percent {
                text.trim_end_matches('%').trim_end()
            } else {
                text
            };
            text.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|number| number.is_finite()).unwrap_or(0.0)
}
