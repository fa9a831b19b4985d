//! # Engine Errors
//!
//! ```text
//! SaleError
//! ├── Domain(CoreError)    business rule; deterministic, retrying won't help
//! ├── Database(DbError)    infrastructure fault; nothing committed, retry the whole call
//! └── TimedOut(Duration)   deadline hit; the open transaction was dropped and rolled back
//! ```

use std::time::Duration;

use stockwise_core::{CoreError, ValidationError};
use stockwise_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaleError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error("Transaction error: {0}")]
    Database(#[from] DbError),

    #[error("Operation timed out after {0:?}")]
    TimedOut(Duration),
}

impl SaleError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            SaleError::Domain(e) => e.code(),
            SaleError::Database(_) => "TRANSACTION_ERROR",
            SaleError::TimedOut(_) => "TIMEOUT",
        }
    }

    /// True when resubmitting the same request unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SaleError::Domain(CoreError::InvoiceNumberUnavailable(_)) => true,
            SaleError::Domain(_) => false,
            SaleError::Database(_) | SaleError::TimedOut(_) => true,
        }
    }
}

impl From<ValidationError> for SaleError {
    fn from(err: ValidationError) -> Self {
        SaleError::Domain(CoreError::Validation(err))
    }
}

pub type SaleResult<T> = Result<T, SaleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_retryability() {
        let err = SaleError::from(CoreError::ItemNotFound("x".into()));
        assert_eq!(err.code(), "ITEM_NOT_FOUND");
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Item not found: x");

        let err = SaleError::from(DbError::PoolExhausted);
        assert_eq!(err.code(), "TRANSACTION_ERROR");
        assert!(err.is_retryable());

        let err = SaleError::TimedOut(Duration::from_secs(1));
        assert!(err.is_retryable());
    }
}
