use stockfolio_core::{PortfolioError, StockError, StockErrorKind, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("interrupted")]
    Interrupted,
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Stock(error) => match error.kind() {
                StockErrorKind::Validation => 2,
                StockErrorKind::Cancelled => 130,
                _ => 3,
            },
            Self::Portfolio(PortfolioError::Validation(_)) => 2,
            Self::Portfolio(PortfolioError::Serialization(_)) | Self::Serialization(_) => 4,
            Self::Portfolio(PortfolioError::Io(_)) | Self::Io(_) => 10,
            Self::Interrupted => 130,
        }
    }
}
