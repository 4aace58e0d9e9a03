use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(trading_day, Date, "[year]-[month]-[day]");

/// Latest quote for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub current_price: f64,
    pub previous_close: f64,
    pub change: f64,
    /// Percentage points, e.g. `1.25` for "1.25%".
    pub change_percent: f64,
    pub volume: u64,
}

/// One daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalData {
    #[serde(with = "trading_day")]
    pub date: Date,
    pub price: f64,
}

impl HistoricalData {
    pub const fn new(date: Date, price: f64) -> Self {
        Self { date, price }
    }
}

/// A symbol-search match.
///
/// Fields the provider leaves out are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSymbol {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub region: String,
    pub currency: String,
}

/// Parses a `YYYY-MM-DD` trading day.
pub fn parse_trading_day(input: &str) -> Option<Date> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(input, format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn historical_dates_serialize_as_calendar_days() {
        let point = HistoricalData::new(date!(2024 - 03 - 08), 178.5);
        let json = serde_json::to_value(point).expect("serialize");
        assert_eq!(json, json!({"date": "2024-03-08", "price": 178.5}));

        let back: HistoricalData = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, point);
    }

    #[test]
    fn search_match_uses_type_field_name() {
        let matched = StockSymbol {
            symbol: String::from("TSLA"),
            name: String::from("Tesla Inc"),
            asset_type: String::from("Equity"),
            region: String::from("United States"),
            currency: String::from("USD"),
        };
        let json = serde_json::to_value(&matched).expect("serialize");
        assert_eq!(json["type"], "Equity");
        assert!(json.get("asset_type").is_none());
    }

    #[test]
    fn trading_day_parsing_rejects_garbage() {
        assert_eq!(parse_trading_day("2024-01-31"), Some(date!(2024 - 01 - 31)));
        assert_eq!(parse_trading_day("2024-02-30"), None);
        assert_eq!(parse_trading_day("Meta Data"), None);
    }
}
