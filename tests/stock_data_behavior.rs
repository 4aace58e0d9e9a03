//! Behavior-driven tests for typed stock data operations.
//!
//! These tests verify HOW quotes, symbol searches and daily series are mapped
//! from provider payloads, and which inputs never reach the network.

mod support;

use std::time::Duration;

use serde_json::json;
use stockfolio_core::error::RATE_LIMIT_MESSAGE;
use stockfolio_core::{
    with_moving_averages, CacheMode, HistoricalData, Stock, StockErrorKind, DEFAULT_HISTORY_DAYS,
};
use support::{
    daily_series_payload, mapper_with, quote_payload, single_attempt_mapper, ScriptedHttpClient,
    RATE_LIMIT_NOTE,
};
use time::macros::date;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Quotes
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_quote_is_returned_system_maps_every_numeric_field() {
    // Given: A provider returning a full global quote
    let http = ScriptedHttpClient::new();
    http.push_json(json!({
        "Global Quote": {
            "01. symbol": "AAPL",
            "05. price": "150.00",
            "08. previous close": "148.00",
            "09. change": "2.00",
            "10. change percent": "1.35%",
            "06. volume": "1000000"
        }
    }));
    let mapper = mapper_with(&http);

    // When: The quote is fetched with untidy input
    let stock = mapper.fetch_quote(" aapl ").await.expect("quote maps");

    // Then: Values are parsed and the request used the canonical symbol
    assert_eq!(
        stock,
        Stock {
            symbol: String::from("AAPL"),
            current_price: 150.0,
            previous_close: 148.0,
            change: 2.0,
            change_percent: 1.35,
            volume: 1_000_000,
        }
    );
    let requests = http.requests();
    assert_eq!(requests[0].query_value("function"), Some("GLOBAL_QUOTE"));
    assert_eq!(requests[0].query_value("symbol"), Some("AAPL"));
}

#[tokio::test(start_paused = true)]
async fn when_symbol_is_empty_system_fails_without_network_call() {
    let http = ScriptedHttpClient::new();
    let mapper = mapper_with(&http);

    for input in ["", "   "] {
        let error = mapper.fetch_quote(input).await.expect_err("validation");
        assert_eq!(error.kind(), StockErrorKind::Validation);
        assert_eq!(error.message(), "Stock symbol is required");
    }
    assert_eq!(http.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn when_global_quote_is_empty_system_reports_not_found_once() {
    // Given: An unknown symbol answered with an empty quote object
    let http = ScriptedHttpClient::new();
    http.always_json(json!({"Global Quote": {}}));
    let mapper = mapper_with(&http);

    // When: The quote is requested
    let error = mapper.fetch_quote("zzzz").await.expect_err("not found");

    // Then: Not found, with a single provider call
    assert_eq!(error.kind(), StockErrorKind::NotFound);
    assert_eq!(
        error.message(),
        "No data found for symbol ZZZZ. Please check and try again."
    );
    assert_eq!(http.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn when_quote_body_is_not_json_system_uses_quote_failure_message() {
    let http = ScriptedHttpClient::new();
    http.push_status(200, "<html>maintenance</html>");
    let mapper = single_attempt_mapper(&http);

    let error = mapper.fetch_quote("AAPL").await.expect_err("bad body");

    assert_eq!(error.kind(), StockErrorKind::Unexpected);
    assert_eq!(error.message(), "Failed to fetch stock data");
}

#[tokio::test(start_paused = true)]
async fn when_provider_sends_quota_note_system_reports_rate_limit_for_every_operation() {
    // Given: A provider that only answers with its quota note
    let http = ScriptedHttpClient::new();
    http.always_json(json!({"Information": RATE_LIMIT_NOTE}));
    let mapper = single_attempt_mapper(&http);

    // When: Each operation is attempted
    let quote = mapper.fetch_quote("AAPL").await.expect_err("quote");
    let search = mapper.search_symbols("apple").await.expect_err("search");
    let history = mapper.fetch_historical("AAPL", 5).await.expect_err("history");

    // Then: All three surface the same normalized message
    for error in [quote, search, history] {
        assert_eq!(error.kind(), StockErrorKind::RateLimited);
        assert_eq!(error.message(), RATE_LIMIT_MESSAGE);
    }
}

// =============================================================================
// Symbol search
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_keywords_are_blank_system_returns_empty_without_network_call() {
    let http = ScriptedHttpClient::new();
    let mapper = mapper_with(&http);

    let matches = mapper.search_symbols("   ").await.expect("blank search");

    assert!(matches.is_empty());
    assert_eq!(http.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn when_matches_are_returned_system_maps_descriptors() {
    // Given: Two matches, one of them missing optional fields
    let http = ScriptedHttpClient::new();
    http.push_json(json!({
        "bestMatches": [
            {
                "1. symbol": "TSLA",
                "2. name": "Tesla Inc",
                "3. type": "Equity",
                "4. region": "United States",
                "5. marketOpen": "09:30",
                "8. currency": "USD",
                "9. matchScore": "1.0000"
            },
            {"1. symbol": "TL0.DEX", "2. name": "Tesla Inc"}
        ]
    }));
    let mapper = mapper_with(&http);

    // When: Keywords with surrounding spaces are searched
    let matches = mapper.search_symbols("  tesla ").await.expect("search");

    // Then: Keywords are trimmed and missing fields are empty
    assert_eq!(http.requests()[0].query_value("keywords"), Some("tesla"));
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].asset_type, "Equity");
    assert_eq!(matches[0].currency, "USD");
    assert_eq!(matches[1].symbol, "TL0.DEX");
    assert_eq!(matches[1].region, "");
}

#[tokio::test(start_paused = true)]
async fn when_best_matches_is_missing_system_returns_empty() {
    let http = ScriptedHttpClient::new();
    http.push_json(json!({}));
    let mapper = mapper_with(&http);

    let matches = mapper.search_symbols("xyzzy").await.expect("search");

    assert!(matches.is_empty());
    assert_eq!(http.call_count(), 1);
}

// =============================================================================
// Daily series
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_series_has_ten_days_system_returns_three_most_recent() {
    // Given: A ten-day series
    let http = ScriptedHttpClient::new();
    http.push_json(daily_series_payload("AAPL", 10));
    let mapper = mapper_with(&http);

    // When: Three days are requested
    let history = mapper.fetch_historical("AAPL", 3).await.expect("history");

    // Then: Exactly the three latest closes, newest first
    assert_eq!(
        history,
        vec![
            HistoricalData::new(date!(2024 - 03 - 29), 109.0),
            HistoricalData::new(date!(2024 - 03 - 28), 108.0),
            HistoricalData::new(date!(2024 - 03 - 27), 107.0),
        ]
    );
    let request = &http.requests()[0];
    assert_eq!(request.query_value("function"), Some("TIME_SERIES_DAILY"));
    assert_eq!(request.query_value("outputsize"), Some("compact"));
}

#[tokio::test(start_paused = true)]
async fn when_window_exceeds_series_length_system_returns_whole_series() {
    let http = ScriptedHttpClient::new();
    http.push_json(daily_series_payload("MSFT", 4));
    let mapper = mapper_with(&http);

    let history = mapper
        .fetch_historical("msft", DEFAULT_HISTORY_DAYS)
        .await
        .expect("history");

    assert_eq!(history.len(), 4);
    assert!(history.windows(2).all(|pair| pair[0].date > pair[1].date));
}

#[tokio::test(start_paused = true)]
async fn when_long_window_is_requested_system_asks_for_full_output() {
    let http = ScriptedHttpClient::new();
    http.push_json(daily_series_payload("AAPL", 20));
    let mapper = mapper_with(&http);

    mapper.fetch_historical("AAPL", 365).await.expect("history");

    assert_eq!(http.requests()[0].query_value("outputsize"), Some("full"));
}

#[tokio::test(start_paused = true)]
async fn when_days_is_zero_system_fails_without_network_call() {
    let http = ScriptedHttpClient::new();
    let mapper = mapper_with(&http);

    let error = mapper.fetch_historical("AAPL", 0).await.expect_err("zero days");

    assert_eq!(error.kind(), StockErrorKind::Validation);
    assert_eq!(error.message(), "days must be greater than zero");
    assert_eq!(http.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn when_series_is_missing_system_reports_not_found() {
    let http = ScriptedHttpClient::new();
    http.push_json(json!({"Meta Data": {"2. Symbol": "ZZZZ"}}));
    let mapper = mapper_with(&http);

    let error = mapper.fetch_historical("zzzz", 7).await.expect_err("no series");

    assert_eq!(error.kind(), StockErrorKind::NotFound);
    assert_eq!(error.message(), "No historical data available for ZZZZ.");
}

// =============================================================================
// Composition
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_trend_view_loads_system_fetches_quote_and_history_concurrently() {
    // Given: A provider with a quote and a series for one symbol
    let http = ScriptedHttpClient::new();
    http.push_json(quote_payload("AAPL", "109.00", "1.00"))
        .push_json(daily_series_payload("AAPL", 6));
    let mapper = mapper_with(&http);
    let start = Instant::now();

    // When: Both are requested together
    let (quote, history) = tokio::join!(
        mapper.fetch_quote("AAPL"),
        mapper.fetch_historical("AAPL", 6)
    );

    // Then: Both complete as two rate-limited calls
    let quote = quote.expect("quote");
    let mut history = history.expect("history");
    assert_eq!(quote.current_price, 109.0);
    assert_eq!(
        http.request_offsets(start),
        vec![Duration::ZERO, Duration::from_secs(12)]
    );

    history.reverse();
    let points = with_moving_averages(&history);
    assert_eq!(points.last().map(|point| point.ma5), Some(103.0));
}

#[tokio::test(start_paused = true)]
async fn when_cache_is_skipped_system_refetches_quote() {
    let http = ScriptedHttpClient::new();
    http.always_json(quote_payload("AAPL", "100.00", "0.00"));
    let mapper = mapper_with(&http).with_cache_mode(CacheMode::Refresh);

    mapper.fetch_quote("AAPL").await.expect("first");
    mapper.fetch_quote("AAPL").await.expect("second");

    assert_eq!(http.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn when_mapper_is_cancelled_system_makes_no_call() {
    let http = ScriptedHttpClient::new();
    http.always_json(quote_payload("AAPL", "100.00", "0.00"));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mapper = mapper_with(&http).with_cancellation(cancel);

    let error = mapper.fetch_quote("AAPL").await.expect_err("cancelled");

    assert_eq!(error.kind(), StockErrorKind::Cancelled);
    assert_eq!(http.call_count(), 0);
}
