//! # Domain Models
//!
//! Typed results handed to callers once a raw provider payload has been
//! mapped.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Stock`] | Latest quote: price, previous close, change, volume |
//! | [`HistoricalData`] | One daily closing price |
//! | [`StockSymbol`] | Symbol-search match |
//! | [`Symbol`] | Validated, uppercased ticker |

mod models;
mod symbol;

pub use models::{parse_trading_day, HistoricalData, Stock, StockSymbol};
pub use symbol::Symbol;
