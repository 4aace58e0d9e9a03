//! CLI argument definitions for stockfolio.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quote` | Latest quotes for one or more symbols |
//! | `search` | Symbol search by name or ticker |
//! | `history` | Daily closes, newest first |
//! | `trend` | Quote plus history with moving averages |
//! | `portfolio` | Add, remove, list and summarize holdings |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--api-key` | `$STOCKFOLIO_API_KEY` or `demo` | Alpha Vantage API key |
//! | `--requests-per-minute` | `5` | Provider quota shared by every call |
//! | `--portfolio` | `~/.stockfolio/portfolio.json` | Portfolio file |
//! | `--no-cache` | `false` | Skip cached responses |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! Responses are cached in memory for the lifetime of one invocation only;
//! separate `stockfolio` runs never share cached data.
//!
//! # Examples
//!
//! ```bash
//! stockfolio quote AAPL MSFT --pretty
//! stockfolio history AAPL --days 30
//! stockfolio portfolio add AAPL 10 --price 150
//! stockfolio portfolio summary
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stockfolio_core::DEFAULT_HISTORY_DAYS;

/// Personal stock portfolio tracker backed by Alpha Vantage.
#[derive(Debug, Parser)]
#[command(name = "stockfolio", author, version, about)]
pub struct Cli {
    /// Alpha Vantage API key. Overrides STOCKFOLIO_API_KEY.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Requests per minute allowed by the API plan.
    #[arg(long, global = true)]
    pub requests_per_minute: Option<u32>,

    /// Portfolio file location.
    #[arg(long, global = true, value_name = "PATH")]
    pub portfolio: Option<PathBuf>,

    /// Ignore cached responses and fetch fresh data.
    ///
    /// The cache lives only for this invocation, so it matters for commands
    /// that repeat a request, such as `trend` or `portfolio summary`.
    #[arg(long, global = true, default_value_t = false)]
    pub no_cache: bool,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log debug diagnostics to stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch latest quote(s) one symbol at a time.
    ///
    /// # Examples
    ///
    ///   stockfolio quote AAPL
    ///   stockfolio quote AAPL MSFT GOOGL --pretty
    Quote(QuoteArgs),

    /// Search symbols by ticker or company name.
    Search(SearchArgs),

    /// Daily closing prices, most recent first.
    History(HistoryArgs),

    /// Quote and history with 5/20-day moving averages, oldest first.
    Trend(TrendArgs),

    /// Manage the local portfolio.
    Portfolio(PortfolioArgs),
}

impl Command {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Quote(_) => "quote",
            Self::Search(_) => "search",
            Self::History(_) => "history",
            Self::Trend(_) => "trend",
            Self::Portfolio(args) => match args.command {
                PortfolioCommand::Add(_) => "portfolio.add",
                PortfolioCommand::Remove(_) => "portfolio.remove",
                PortfolioCommand::List => "portfolio.list",
                PortfolioCommand::Summary => "portfolio.summary",
            },
        }
    }
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// One or more symbols (e.g., AAPL, MSFT, BRK.B).
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-form keywords.
    pub keywords: String,

    /// Maximum number of matches to print.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    pub symbol: String,

    /// Number of trading days.
    #[arg(long, default_value_t = DEFAULT_HISTORY_DAYS)]
    pub days: usize,
}

#[derive(Debug, Args)]
pub struct TrendArgs {
    pub symbol: String,

    /// Number of trading days.
    #[arg(long, default_value_t = 30)]
    pub days: usize,
}

#[derive(Debug, Args)]
pub struct PortfolioArgs {
    #[command(subcommand)]
    pub command: PortfolioCommand,
}

#[derive(Debug, Subcommand)]
pub enum PortfolioCommand {
    /// Add shares; repeated symbols are merged at a weighted average price.
    Add(PortfolioAddArgs),
    /// Remove a symbol.
    Remove(PortfolioRemoveArgs),
    /// Print holdings as stored.
    List,
    /// Refresh quotes and print totals.
    Summary,
}

#[derive(Debug, Args)]
pub struct PortfolioAddArgs {
    pub symbol: String,

    pub quantity: f64,

    /// Purchase price per share. Defaults to the live quote.
    #[arg(long)]
    pub price: Option<f64>,
}

#[derive(Debug, Args)]
pub struct PortfolioRemoveArgs {
    pub symbol: String,
}
