use std::path::Path;

use serde_json::json;
use stockfolio_core::{PortfolioStock, PortfolioStore, StockDataMapper, Symbol};
use tracing::info;

use crate::cli::{PortfolioAddArgs, PortfolioArgs, PortfolioCommand, PortfolioRemoveArgs};
use crate::commands::{CommandResult, ErrorReport};
use crate::error::CliError;

pub async fn run(
    args: &PortfolioArgs,
    path: Option<&Path>,
    mapper: &StockDataMapper,
) -> Result<CommandResult, CliError> {
    let mut store = match path {
        Some(path) => PortfolioStore::open(path)?,
        None => PortfolioStore::open_default()?,
    };

    match &args.command {
        PortfolioCommand::Add(add) => run_add(add, &mut store, mapper).await,
        PortfolioCommand::Remove(remove) => run_remove(remove, &mut store),
        PortfolioCommand::List => Ok(CommandResult::ok(json!({
            "path": store.path().display().to_string(),
            "holdings": store.holdings(),
        }))),
        PortfolioCommand::Summary => run_summary(&mut store, mapper).await,
    }
}

/// Without `--price` the live quote becomes the purchase price.
async fn run_add(
    args: &PortfolioAddArgs,
    store: &mut PortfolioStore,
    mapper: &StockDataMapper,
) -> Result<CommandResult, CliError> {
    let mut holding = PortfolioStock::new(&args.symbol, args.quantity, args.price.unwrap_or(0.0))?;
    if args.price.is_none() {
        let quote = mapper.fetch_quote(holding.symbol.as_str()).await?;
        holding.average_price = quote.current_price;
        holding = holding.with_quote(quote);
    }

    let holding = store.add(holding)?.clone();
    info!(symbol = %holding.symbol, quantity = holding.quantity, "holding saved");

    Ok(CommandResult::ok(json!({
        "holding": holding,
        "holdings": store.len(),
    })))
}

fn run_remove(
    args: &PortfolioRemoveArgs,
    store: &mut PortfolioStore,
) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let removed = store.remove(symbol.as_str())?;

    Ok(CommandResult::ok(json!({
        "symbol": symbol,
        "removed": removed,
    })))
}

async fn run_summary(
    store: &mut PortfolioStore,
    mapper: &StockDataMapper,
) -> Result<CommandResult, CliError> {
    let report = store.refresh_quotes(mapper).await?;
    if report.cancelled {
        return Err(CliError::Interrupted);
    }

    let errors = report
        .failures
        .iter()
        .map(|failure| ErrorReport {
            symbol: Some(failure.symbol.to_string()),
            code: failure.code,
            message: failure.message.clone(),
        })
        .collect();

    Ok(CommandResult::ok(json!({
        "summary": store.summary(),
        "holdings": store.holdings(),
    }))
    .with_errors(errors))
}
