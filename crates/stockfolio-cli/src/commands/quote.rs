use serde_json::json;
use stockfolio_core::{StockDataMapper, StockErrorKind};
use tracing::warn;

use crate::cli::QuoteArgs;
use crate::commands::{CommandResult, ErrorReport};
use crate::error::CliError;

/// Quotes are fetched one after another so the provider quota is honoured
/// in argument order. A failed symbol does not stop the rest.
pub async fn run(args: &QuoteArgs, mapper: &StockDataMapper) -> Result<CommandResult, CliError> {
    let mut quotes = Vec::with_capacity(args.symbols.len());
    let mut errors = Vec::new();

    for symbol in &args.symbols {
        match mapper.fetch_quote(symbol).await {
            Ok(quote) => quotes.push(quote),
            Err(error) if error.kind() == StockErrorKind::Cancelled => return Err(error.into()),
            Err(error) => {
                warn!(%symbol, %error, "quote failed");
                errors.push(ErrorReport::for_symbol(symbol.trim(), &error));
            }
        }
    }

    Ok(CommandResult::ok(json!({ "quotes": quotes })).with_errors(errors))
}
