use serde_json::json;
use stockfolio_core::StockDataMapper;

use crate::cli::SearchArgs;
use crate::commands::CommandResult;
use crate::error::CliError;

pub async fn run(args: &SearchArgs, mapper: &StockDataMapper) -> Result<CommandResult, CliError> {
    let mut matches = mapper.search_symbols(&args.keywords).await?;
    matches.truncate(args.limit);

    Ok(CommandResult::ok(json!({
        "keywords": args.keywords.trim(),
        "matches": matches,
    })))
}
