//! Shared doubles for the behaviour tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use stockfolio_core::{
    ApiClient, ApiConfig, HttpClient, HttpError, HttpRequest, HttpResponse, RetryConfig,
    StockDataMapper,
};
use tokio::time::Instant;

type Scripted = Result<HttpResponse, HttpError>;

/// In-process transport that replays scripted responses and records every
/// request it receives.
#[derive(Default)]
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Scripted>>,
    fallback: Mutex<Option<Scripted>>,
    latency: Mutex<Duration>,
    requests: Mutex<Vec<(Instant, HttpRequest)>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: Scripted) -> &Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(response);
        self
    }

    pub fn push_json(&self, payload: Value) -> &Self {
        self.push(Ok(HttpResponse::ok_json(payload.to_string())))
    }

    pub fn push_status(&self, status: u16, body: &str) -> &Self {
        self.push(Ok(HttpResponse::new(status, body)))
    }

    /// Response served once the scripted queue is exhausted.
    pub fn always(&self, response: Scripted) -> &Self {
        *self.fallback.lock().expect("fallback lock") = Some(response);
        self
    }

    pub fn always_json(&self, payload: Value) -> &Self {
        self.always(Ok(HttpResponse::ok_json(payload.to_string())))
    }

    /// Simulated time each request spends in flight.
    pub fn with_latency(&self, latency: Duration) -> &Self {
        *self.latency.lock().expect("latency lock") = latency;
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    /// Offsets of every request from `start`.
    pub fn request_offsets(&self, start: Instant) -> Vec<Duration> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .map(|(at, _)| at.duration_since(start))
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    fn next_response(&self) -> Scripted {
        if let Some(response) = self.responses.lock().expect("responses lock").pop_front() {
            return response;
        }
        self.fallback
            .lock()
            .expect("fallback lock")
            .clone()
            .unwrap_or_else(|| Err(HttpError::connect("no scripted response left")))
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((Instant::now(), request));
        let response = self.next_response();
        let latency = *self.latency.lock().expect("latency lock");

        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            response
        })
    }
}

pub fn test_config() -> ApiConfig {
    ApiConfig::default()
        .with_api_key("test-key")
        .with_base_url("https://provider.test/query")
}

pub fn client_with(http: &Arc<ScriptedHttpClient>) -> ApiClient {
    client_with_config(http, test_config())
}

pub fn client_with_config(http: &Arc<ScriptedHttpClient>, config: ApiConfig) -> ApiClient {
    let transport: Arc<dyn HttpClient> = http.clone();
    ApiClient::builder(config).with_http_client(transport).build()
}

pub fn mapper_with(http: &Arc<ScriptedHttpClient>) -> StockDataMapper {
    StockDataMapper::new(client_with(http))
}

pub fn single_attempt_mapper(http: &Arc<ScriptedHttpClient>) -> StockDataMapper {
    StockDataMapper::new(client_with_config(
        http,
        test_config().with_retry(RetryConfig::no_retry()),
    ))
}

pub fn quote_payload(symbol: &str, price: &str, change: &str) -> Value {
    json!({
        "Global Quote": {
            "01. symbol": symbol,
            "02. open": price,
            "05. price": price,
            "06. volume": "1000000",
            "07. latest trading day": "2024-03-08",
            "08. previous close": price,
            "09. change": change,
            "10. change percent": "0.00%"
        }
    })
}

/// A daily series of `days` rows ending 2024-03-29, closes 100, 101, ...
/// oldest first.
pub fn daily_series_payload(symbol: &str, days: u8) -> Value {
    let mut series = serde_json::Map::new();
    for offset in 0..days {
        let day = 29 - u32::from(offset);
        let close = 100.0 + f64::from(days - 1 - offset);
        series.insert(
            format!("2024-03-{day:02}"),
            json!({
                "1. open": format!("{close:.2}"),
                "4. close": format!("{close:.2}"),
                "5. volume": "1000"
            }),
        );
    }

    json!({
        "Meta Data": {"2. Symbol": symbol},
        "Time Series (Daily)": series
    })
}

pub const RATE_LIMIT_NOTE: &str = "Thank you for using Alpha Vantage! Our standard API call \
frequency is 5 calls per minute and 500 calls per day.";
