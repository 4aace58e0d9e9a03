use thiserror::Error;

pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";
pub const RATE_LIMIT_MESSAGE: &str = "API rate limit exceeded. Please try again in a minute.";
pub const SERVER_MESSAGE: &str = "Server error. Please try again later.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";
pub const CANCELLED_MESSAGE: &str = "Request was cancelled.";

/// Failure category of a normalized [`StockError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockErrorKind {
    Validation,
    NotFound,
    RateLimited,
    Timeout,
    Network,
    Server,
    Provider,
    Cancelled,
    Unexpected,
}

/// The single error kind surfaced by the API access layer.
///
/// `Display` renders only the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StockError {
    kind: StockErrorKind,
    message: String,
}

impl StockError {
    pub fn new(kind: StockErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StockErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StockErrorKind::NotFound, message)
    }

    pub fn rate_limited() -> Self {
        Self::new(StockErrorKind::RateLimited, RATE_LIMIT_MESSAGE)
    }

    pub fn timeout() -> Self {
        Self::new(StockErrorKind::Timeout, TIMEOUT_MESSAGE)
    }

    pub fn network() -> Self {
        Self::new(StockErrorKind::Network, NETWORK_MESSAGE)
    }

    pub fn server() -> Self {
        Self::new(StockErrorKind::Server, SERVER_MESSAGE)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(StockErrorKind::Provider, message)
    }

    pub fn cancelled() -> Self {
        Self::new(StockErrorKind::Cancelled, CANCELLED_MESSAGE)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(StockErrorKind::Unexpected, message)
    }

    pub const fn kind(&self) -> StockErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether another attempt could plausibly succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            StockErrorKind::Timeout
                | StockErrorKind::Network
                | StockErrorKind::Server
                | StockErrorKind::RateLimited
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            StockErrorKind::Validation => "stock.validation",
            StockErrorKind::NotFound => "stock.not_found",
            StockErrorKind::RateLimited => "stock.rate_limited",
            StockErrorKind::Timeout => "stock.timeout",
            StockErrorKind::Network => "stock.network",
            StockErrorKind::Server => "stock.server",
            StockErrorKind::Provider => "stock.provider",
            StockErrorKind::Cancelled => "stock.cancelled",
            StockErrorKind::Unexpected => "stock.unexpected",
        }
    }
}

/// Input validation errors raised before any network call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Stock symbol is required")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("days must be greater than zero")]
    ZeroDays,

    #[error("quantity must be a positive number")]
    NonPositiveQuantity,
    #[error("average price must be a non-negative number")]
    NegativePrice,
}

impl From<ValidationError> for StockError {
    fn from(error: ValidationError) -> Self {
        Self::validation(error.to_string())
    }
}

/// Errors from the locally persisted portfolio.
#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("portfolio storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("portfolio serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_message_only() {
        let error = StockError::rate_limited();
        assert_eq!(error.to_string(), RATE_LIMIT_MESSAGE);
        assert_eq!(error.code(), "stock.rate_limited");
    }

    #[test]
    fn only_transport_and_quota_failures_are_transient() {
        assert!(StockError::timeout().is_transient());
        assert!(StockError::network().is_transient());
        assert!(StockError::server().is_transient());
        assert!(StockError::rate_limited().is_transient());

        assert!(!StockError::validation("bad").is_transient());
        assert!(!StockError::not_found("missing").is_transient());
        assert!(!StockError::provider("Invalid API call").is_transient());
        assert!(!StockError::cancelled().is_transient());
        assert!(!StockError::unexpected(UNEXPECTED_MESSAGE).is_transient());
    }

    #[test]
    fn empty_symbol_converts_to_required_message() {
        let error = StockError::from(ValidationError::EmptySymbol);
        assert_eq!(error.kind(), StockErrorKind::Validation);
        assert_eq!(error.message(), "Stock symbol is required");
    }
}
