//! # Error Types
//!
//! Domain-specific error types for stockwise-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockwise-core errors (this file)                                      │
//! │  ├── CoreError           - Sale/stock domain taxonomy                   │
//! │  ├── PromotionRejection  - Why a promotion was refused                  │
//! │  └── ValidationError     - Input validation failures                    │
//! │                                                                         │
//! │  stockwise-db errors (separate crate)                                   │
//! │  └── DbError             - Database operation failures                  │
//! │                                                                         │
//! │  stockwise-engine errors                                                │
//! │  └── SaleError           - CoreError | DbError | TimedOut               │
//! │                                                                         │
//! │  HTTP errors (in app)                                                   │
//! │  └── ApiError            - What POS clients see (serialized)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` has a stable machine code (`CoreError::code`) that
//! clients key on. Messages are for humans and may change.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while selling or moving stock.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The conditional decrement guard failed.
    ///
    /// ## Propagation
    /// ```text
    /// checkout  → whole transaction rolls back, surfaced as conflict (409)
    /// sync      → only this record is marked failed
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Item id absent from the merchant's catalog (or inactive).
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Shop not found: {0}")]
    ShopNotFound(String),

    /// The shop belongs to another merchant, or the caller is pinned to a
    /// different shop. Raised before any mutation.
    #[error("Access denied to shop {shop_id}")]
    ShopAccessDenied { shop_id: String },

    #[error("Invalid promotion {promotion_id}: {reason}")]
    InvalidPromotion {
        promotion_id: String,
        reason: PromotionRejection,
    },

    /// The invoice sequence could not produce a number.
    #[error("Invoice number unavailable: {0}")]
    InvoiceNumberUnavailable(String),

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            CoreError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            CoreError::ShopNotFound(_) => "SHOP_NOT_FOUND",
            CoreError::ShopAccessDenied { .. } => "SHOP_ACCESS_DENIED",
            CoreError::InvalidPromotion { .. } => "INVALID_PROMOTION",
            CoreError::InvoiceNumberUnavailable(_) => "INVOICE_NUMBER_UNAVAILABLE",
            CoreError::SaleNotFound(_) => "SALE_NOT_FOUND",
            CoreError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

// =============================================================================
// Promotion Rejection
// =============================================================================

/// Reason a promotion could not be applied. Checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromotionRejection {
    #[error("promotion does not exist")]
    NotFound,

    #[error("promotion belongs to another merchant")]
    WrongMerchant,

    #[error("promotion is not active")]
    Inactive,

    #[error("promotion has not started yet")]
    NotStarted,

    #[error("promotion has expired")]
    Expired,

    #[error("promotion is not valid at this shop")]
    WrongShop,

    #[error("minimum spend of {min_spend} not reached (subtotal {subtotal})")]
    BelowMinimumSpend { min_spend: Money, subtotal: Money },

    /// Negative value, or a percentage above 100%.
    #[error("promotion value is invalid")]
    InvalidValue,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before any business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A collection had too many entries (cart lines, batch records).
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },

    /// Two fields that must differ are equal (transfer source and destination).
    #[error("{field} must differ from {other}")]
    MustDiffer { field: String, other: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
