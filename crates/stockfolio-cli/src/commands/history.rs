use serde_json::json;
use stockfolio_core::{StockDataMapper, Symbol};

use crate::cli::HistoryArgs;
use crate::commands::CommandResult;
use crate::error::CliError;

pub async fn run(args: &HistoryArgs, mapper: &StockDataMapper) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let history = mapper.fetch_historical(symbol.as_str(), args.days).await?;

    Ok(CommandResult::ok(json!({
        "symbol": symbol,
        "days": history.len(),
        "history": history,
    })))
}
