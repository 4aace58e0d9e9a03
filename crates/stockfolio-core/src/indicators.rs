//! Moving averages for trend views.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::HistoricalData;

time::serde::format_description!(trend_day, Date, "[year]-[month]-[day]");

pub const SHORT_PERIOD: usize = 5;
pub const LONG_PERIOD: usize = 20;

/// A daily close with the moving averages known on that day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(with = "trend_day")]
    pub date: Date,
    pub price: f64,
    pub ma5: f64,
    pub ma20: f64,
}

/// Mean of the last `period` prices.
///
/// With fewer than `period` prices the latest price is returned as is;
/// `None` only for an empty slice.
pub fn moving_average(prices: &[f64], period: usize) -> Option<f64> {
    let last = *prices.last()?;
    if period == 0 || prices.len() < period {
        return Some(last);
    }

    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Attaches `ma5`/`ma20` to a chronologically ordered (oldest first) series.
pub fn with_moving_averages(series: &[HistoricalData]) -> Vec<TrendPoint> {
    let prices: Vec<f64> = series.iter().map(|point| point.price).collect();

    series
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let seen = &prices[..=index];
            TrendPoint {
                date: point.date,
                price: point.price,
                ma5: moving_average(seen, SHORT_PERIOD).unwrap_or(point.price),
                ma20: moving_average(seen, LONG_PERIOD).unwrap_or(point.price),
            }
        })
        .collect()
}
