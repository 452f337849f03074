//! Error types and handling for BitSlots
//!
//! A single structured error enum covering the whole crate, with category
//! and severity accessors for monitoring. Nothing in this core retries:
//! every operation is a pure computation over provided data, so errors are
//! either fatal configuration/caller bugs or reported conditions owned by
//! an external collaborator's policy.

use thiserror::Error;

/// Result type alias for BitSlots operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Paytable, reel, or payline definition errors
    Configuration,
    /// Game logic and evaluation errors
    Gaming,
    /// Credit and meter errors
    Resources,
    /// User input validation errors
    Validation,
    /// Internal system errors
    Internal,
}

impl ErrorCategory {
    /// Get the monitoring severity level for this category
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration | Self::Gaming => ErrorSeverity::Critical,
            Self::Internal => ErrorSeverity::High,
            Self::Resources => ErrorSeverity::Medium,
            Self::Validation => ErrorSeverity::Low,
        }
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// BitSlots error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON error: {}", err))
    }
}

impl Error {
    /// Get a default error code for telemetry
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "E001",
            Self::IndexOutOfBounds(_) => "E002",
            Self::InsufficientFunds(_) => "E003",
            Self::InvalidInput(_) => "E004",
            Self::ArithmeticOverflow(_) => "E005",
            Self::Serialization(_) => "E006",
        }
    }

    /// Get the error category for monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfiguration(_) => ErrorCategory::Configuration,
            Self::IndexOutOfBounds(_) | Self::ArithmeticOverflow(_) => ErrorCategory::Gaming,
            Self::InsufficientFunds(_) => ErrorCategory::Resources,
            Self::InvalidInput(_) => ErrorCategory::Validation,
            Self::Serialization(_) => ErrorCategory::Internal,
        }
    }

    /// Get the error severity for alerting
    pub fn severity(&self) -> ErrorSeverity {
        self.category().severity()
    }

    /// Create an insufficient funds error with structured context
    pub fn insufficient_funds_for(operation: impl Into<String>, required: u64, available: u64) -> Self {
        Error::InsufficientFunds(format!(
            "Insufficient funds for {}: required {}, available {}",
            operation.into(),
            required,
            available
        ))
    }

    /// Create a configuration error with field details
    pub fn configuration(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::InvalidConfiguration(format!("{}: {}", field.into(), detail.into()))
    }
}
