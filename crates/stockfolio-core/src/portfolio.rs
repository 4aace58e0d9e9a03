//! Locally persisted holdings.
//!
//! The whole portfolio lives in one JSON document. It is read once on
//! [`PortfolioStore::open`] and rewritten wholesale after every change.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Stock, Symbol};
use crate::error::{PortfolioError, StockErrorKind, ValidationError};
use crate::stock_data::StockDataMapper;

pub const ENV_HOME: &str = "STOCKFOLIO_HOME";
pub const PORTFOLIO_FILE: &str = "portfolio.json";

/// A held position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStock {
    pub symbol: Symbol,
    pub quantity: f64,
    pub average_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_quote: Option<Stock>,
}

impl PortfolioStock {
    pub fn new(symbol: &str, quantity: f64, average_price: f64) -> Result<Self, ValidationError> {
        let symbol = Symbol::parse(symbol)?;
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(ValidationError::NonPositiveQuantity);
        }
        if !(average_price.is_finite() && average_price >= 0.0) {
            return Err(ValidationError::NegativePrice);
        }

        Ok(Self {
            symbol,
            quantity,
            average_price,
            last_quote: None,
        })
    }

    pub fn with_quote(mut self, quote: Stock) -> Self {
        self.last_quote = Some(quote);
        self
    }

    /// Last known price, or the purchase price when no quote was fetched yet.
    pub fn market_price(&self) -> f64 {
        self.last_quote
            .as_ref()
            .map_or(self.average_price, |quote| quote.current_price)
    }

    pub fn market_value(&self) -> f64 {
        self.market_price() * self.quantity
    }

    pub fn cost_basis(&self) -> f64 {
        self.average_price * self.quantity
    }

    pub fn gain_loss(&self) -> f64 {
        self.market_value() - self.cost_basis()
    }

    pub fn day_change(&self) -> f64 {
        self.last_quote
            .as_ref()
            .map_or(0.0, |quote| quote.change * self.quantity)
    }
}

/// Totals across every holding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub holdings: usize,
    pub total_value: f64,
    pub total_cost: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
    pub day_change: f64,
}

/// A symbol whose quote could not be refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshFailure {
    pub symbol: Symbol,
    pub code: &'static str,
    pub message: String,
}

/// Outcome of [`PortfolioStore::refresh_quotes`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    pub updated: Vec<Symbol>,
    pub failures: Vec<RefreshFailure>,
    pub cancelled: bool,
}

#[derive(Debug)]
pub struct PortfolioStore {
    path: PathBuf,
    holdings: Vec<PortfolioStock>,
    // Set when the file on disk could not be parsed.
    backup_on_save: bool,
}

impl PortfolioStore {
    /// Loads the portfolio at `path`.
    ///
    /// A missing file is an empty portfolio; so is an unreadable document.
    /// The unreadable file is moved to `<path>.bak` before the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PortfolioError> {
        let path = path.into();
        let mut backup_on_save = false;
        let holdings = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<PortfolioStock>>(&content) {
                Ok(holdings) => holdings,
                Err(error) => {
                    warn!(path = %path.display(), %error, "ignoring corrupt portfolio file");
                    backup_on_save = true;
                    Vec::new()
                }
            },
            Err(error) if error.kind() == ErrorKind::NotFound => Vec::new(),
            Err(error) => return Err(error.into()),
        };

        debug!(path = %path.display(), holdings = holdings.len(), "portfolio loaded");
        Ok(Self {
            path,
            holdings,
            backup_on_save,
        })
    }

    /// Opens the portfolio at [`default_portfolio_path`].
    pub fn open_default() -> Result<Self, PortfolioError> {
        Self::open(default_portfolio_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn holdings(&self) -> &[PortfolioStock] {
        &self.holdings
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&PortfolioStock> {
        self.holdings.iter().find(|holding| &holding.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Adds a position, merging it into an existing holding of the same
    /// symbol with a quantity-weighted average price.
    pub fn add(&mut self, stock: PortfolioStock) -> Result<&PortfolioStock, PortfolioError> {
        let index = match self
            .holdings
            .iter()
            .position(|holding| holding.symbol == stock.symbol)
        {
            Some(index) => {
                let existing = &mut self.holdings[index];
                let quantity = existing.quantity + stock.quantity;
                existing.average_price = (existing.average_price * existing.quantity
                    + stock.average_price * stock.quantity)
                    / quantity;
                existing.quantity = quantity;
                if stock.last_quote.is_some() {
                    existing.last_quote = stock.last_quote;
                }
                index
            }
            None => {
                self.holdings.push(stock);
                self.holdings.len() - 1
            }
        };

        self.save()?;
        Ok(&self.holdings[index])
    }

    /// Removes `symbol`; returns whether it was held.
    pub fn remove(&mut self, symbol: &str) -> Result<bool, PortfolioError> {
        let symbol = Symbol::parse(symbol)?;
        let before = self.holdings.len();
        self.holdings.retain(|holding| holding.symbol != symbol);

        let removed = self.holdings.len() != before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Fetches a fresh quote for every holding, one symbol at a time.
    ///
    /// Failed symbols keep their previous quote and are listed in the report.
    /// Cancellation stops the loop; quotes fetched so far are still saved.
    pub async fn refresh_quotes(
        &mut self,
        mapper: &StockDataMapper,
    ) -> Result<RefreshReport, PortfolioError> {
        let mut report = RefreshReport::default();

        for holding in &mut self.holdings {
            match mapper.fetch_quote(holding.symbol.as_str()).await {
                Ok(quote) => {
                    holding.last_quote = Some(quote);
                    report.updated.push(holding.symbol.clone());
                }
                Err(error) if error.kind() == StockErrorKind::Cancelled => {
                    report.cancelled = true;
                    break;
                }
                Err(error) => {
                    warn!(symbol = %holding.symbol, %error, "quote refresh failed");
                    report.failures.push(RefreshFailure {
                        symbol: holding.symbol.clone(),
                        code: error.code(),
                        message: error.message().to_owned(),
                    });
                }
            }
        }

        if !report.updated.is_empty() {
            self.save()?;
        }
        Ok(report)
    }

    pub fn summary(&self) -> PortfolioSummary {
        let total_value: f64 = self.holdings.iter().map(PortfolioStock::market_value).sum();
        let total_cost: f64 = self.holdings.iter().map(PortfolioStock::cost_basis).sum();
        let total_gain_loss = total_value - total_cost;
        let total_gain_loss_percent = if total_cost > 0.0 {
            total_gain_loss / total_cost * 100.0
        } else {
            0.0
        };

        PortfolioSummary {
            holdings: self.holdings.len(),
            total_value,
            total_cost,
            total_gain_loss,
            total_gain_loss_percent,
            day_change: self.holdings.iter().map(PortfolioStock::day_change).sum(),
        }
    }

    /// Path the unreadable original is moved to before it is overwritten.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    fn save(&mut self) -> Result<(), PortfolioError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if self.backup_on_save {
            let backup = self.backup_path();
            fs::rename(&self.path, &backup)?;
            warn!(path = %backup.display(), "unreadable portfolio moved aside");
            self.backup_on_save = false;
        }

        let content = serde_json::to_string_pretty(&self.holdings)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content)?;
        fs::rename(&staging, &self.path)?;

        debug!(path = %self.path.display(), holdings = self.holdings.len(), "portfolio saved");
        Ok(())
    }
}

/// `$STOCKFOLIO_HOME/portfolio.json`, falling back to `~/.stockfolio`.
pub fn default_portfolio_path() -> PathBuf {
    resolve_home().join(PORTFOLIO_FILE)
}

fn resolve_home() -> PathBuf {
    if let Some(path) = env::var_os(ENV_HOME) {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".stockfolio");
    }

    PathBuf::from(".stockfolio")
}
