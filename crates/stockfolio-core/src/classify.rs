//! Failure normalization at the API boundary.
//!
//! Every failure is reduced to a [`StockError`] using a fixed precedence:
//!
//! | Order | Condition | Message |
//! |-------|-----------|---------|
//! | 1 | transport timeout | [`TIMEOUT_MESSAGE`](crate::error::TIMEOUT_MESSAGE) |
//! | 2 | no response received | [`NETWORK_MESSAGE`](crate::error::NETWORK_MESSAGE) |
//! | 3 | HTTP 429 | [`RATE_LIMIT_MESSAGE`](crate::error::RATE_LIMIT_MESSAGE) |
//! | 4 | HTTP >= 500 | [`SERVER_MESSAGE`](crate::error::SERVER_MESSAGE) |
//! | 5 | `Note` / `Information` marker | rate-limit message, or the note verbatim |
//! | 6 | `Error Message` marker | verbatim |
//! | 7 | anything else | caller-supplied default |
//!
//! An already-normalized error passes through untouched.

use serde_json::Value;

use crate::error::StockError;
use crate::http_client::{HttpError, HttpErrorKind};

const NOTE_FIELDS: [&str; 2] = ["Note", "Information"];
const ERROR_FIELD: &str = "Error Message";

const RATE_LIMIT_HINTS: [&str; 4] = [
    "thank you for using alpha vantage",
    "rate limit",
    "call frequency",
    "requests per",
];

/// Raw failure observed somewhere between the caller and the provider.
#[derive(Debug)]
pub enum Failure {
    /// Already classified; returned unchanged.
    Normalized(StockError),
    /// The transport gave up before a usable response arrived.
    Transport(HttpError),
    /// A non-2xx response.
    Status { status: u16, body: String },
    /// A decoded payload that could not be mapped.
    Payload(Value),
    /// Anything else (decode errors, unexpected shapes).
    Other(String),
}

impl From<StockError> for Failure {
    fn from(error: StockError) -> Self {
        Self::Normalized(error)
    }
}

impl From<HttpError> for Failure {
    fn from(error: HttpError) -> Self {
        Self::Transport(error)
    }
}

impl From<serde_json::Error> for Failure {
    fn from(error: serde_json::Error) -> Self {
        Self::Other(error.to_string())
    }
}

/// Normalizes `failure`, using `default_message` when nothing more specific applies.
pub fn classify(failure: impl Into<Failure>, default_message: &str) -> StockError {
    match failure.into() {
        Failure::Normalized(error) => error,
        Failure::Transport(error) => match error.kind() {
            HttpErrorKind::Timeout => StockError::timeout(),
            HttpErrorKind::Connect => StockError::network(),
            HttpErrorKind::Body | HttpErrorKind::Request => StockError::unexpected(default_message),
        },
        Failure::Status { status, body } => classify_status(status, &body, default_message),
        Failure::Payload(payload) => provider_marker(&payload)
            .unwrap_or_else(|| StockError::unexpected(default_message)),
        Failure::Other(_) => StockError::unexpected(default_message),
    }
}

fn classify_status(status: u16, body: &str, default_message: &str) -> StockError {
    if status == 429 {
        return StockError::rate_limited();
    }
    if status >= 500 {
        return StockError::server();
    }

    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|payload| provider_marker(&payload))
        .unwrap_or_else(|| StockError::unexpected(default_message))
}

/// Provider-level error carried inside an otherwise well-formed payload.
///
/// Returns `None` when the payload has no `Note`, `Information` or
/// `Error Message` field.
pub fn provider_marker(payload: &Value) -> Option<StockError> {
    for field in NOTE_FIELDS {
        if let Some(note) = payload.get(field) {
            let text = marker_text(note);
            if mentions_rate_limit(&text) {
                return Some(StockError::rate_limited());
            }
            return Some(StockError::provider(text));
        }
    }

    payload
        .get(ERROR_FIELD)
        .map(|message| StockError::provider(marker_text(message)))
}

fn marker_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn mentions_rate_limit(text: &str) -> bool {
    let lowered = text.to_ascii_lowercase();
    RATE_LIMIT_HINTS.iter().any(|hint| lowered.contains(hint))
}
