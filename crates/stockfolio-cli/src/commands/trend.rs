use serde_json::json;
use stockfolio_core::{with_moving_averages, StockDataMapper, Symbol};

use crate::cli::TrendArgs;
use crate::commands::CommandResult;
use crate::error::CliError;

/// Quote and history are requested together; the shared rate limiter
/// spaces them out.
pub async fn run(args: &TrendArgs, mapper: &StockDataMapper) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let (quote, history) = tokio::join!(
        mapper.fetch_quote(symbol.as_str()),
        mapper.fetch_historical(symbol.as_str(), args.days),
    );
    let quote = quote?;
    let mut history = history?;

    // Averages are computed oldest to newest.
    history.reverse();
    let points = with_moving_averages(&history);

    Ok(CommandResult::ok(json!({
        "quote": quote,
        "points": points,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{daily_body, quote_body, StubProvider};

    #[tokio::test(start_paused = true)]
    async fn points_run_oldest_to_newest_with_averages() {
        let provider = StubProvider::new()
            .with_quote(quote_body("IBM", 104.0))
            .with_daily(daily_body(&[
                ("2024-03-25", 100.0),
                ("2024-03-26", 101.0),
                ("2024-03-27", 102.0),
                ("2024-03-28", 103.0),
                ("2024-03-29", 104.0),
                ("2024-03-22", 99.0),
            ]));
        let args = TrendArgs {
            symbol: String::from("IBM"),
            days: 5,
        };

        let result = run(&args, &provider.mapper()).await.expect("command result");

        assert_eq!(result.data["quote"]["current_price"], 104.0);
        let points = result.data["points"].as_array().expect("points");
        assert_eq!(points.len(), 5);
        assert_eq!(points[0]["date"], "2024-03-25");
        assert_eq!(points[4]["ma5"], 102.0);
        assert_eq!(points[4]["ma20"], 104.0);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn a_failed_leg_fails_the_command() {
        let provider = StubProvider::new()
            .with_quote(quote_body("IBM", 104.0))
            .with_daily(r#"{"Error Message": "Invalid API call."}"#);
        let args = TrendArgs {
            symbol: String::from("IBM"),
            days: 5,
        };

        let error = run(&args, &provider.mapper()).await.err().expect("error");

        assert_eq!(error.exit_code(), 3);
        assert_eq!(error.to_string(), "Invalid API call.");
    }
}
