//! Provider operations and their request parameters.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Provider operation issued through the `function` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Quote,
    Search,
    DailySeries,
}

impl Endpoint {
    /// Value of the provider's `function` parameter.
    pub const fn function(self) -> &'static str {
        match self {
            Self::Quote => "GLOBAL_QUOTE",
            Self::Search => "SYMBOL_SEARCH",
            Self::DailySeries => "TIME_SERIES_DAILY",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Search => "search",
            Self::DailySeries => "daily_series",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint-specific query parameters, kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Deterministic cache key for a provider call.
///
/// Parameter order does not matter; the API key is never part of the key.
pub fn fingerprint(endpoint: Endpoint, params: &QueryParams) -> String {
    let mut key = String::from(endpoint.function());
    key.push(':');
    key.push('{');
    for (index, (name, value)) in params.iter().enumerate() {
        if index > 0 {
            key.push(',');
        }
        key.push_str(&serde_json::Value::from(name).to_string());
        key.push(':');
        key.push_str(&serde_json::Value::from(value).to_string());
    }
    key.push('}');
    key
}
