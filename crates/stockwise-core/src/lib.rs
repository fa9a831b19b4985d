//! # stockwise-core: Pure Business Logic for Stockwise
//!
//! Types and rules of the sale-transaction and stock-consistency engine,
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockwise Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │   merchant / staff / shop checkout ─ sync batch ─ stock reads   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stockwise-engine                             │   │
//! │  │   SaleTransactionProcessor ─ OfflineSyncReconciler ─ Inventory  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockwise-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   types ─ money ─ promotion ─ identity ─ invoice ─ validation   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK READS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stockwise-db                                 │   │
//! │  │              SQLite queries, migrations, StockLedger            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Persisted entities (Shop, ShopStock, Sale, Invoice, ...)
//! - [`dto`] - Checkout and sync request/response shapes
//! - [`money`] - Integer-cents money type
//! - [`promotion`] - PromotionValidator
//! - [`identity`] - Typed caller identity and shop scoping
//! - [`invoice`] - Invoice number formatting and sale totals
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockwise_core::invoice::SaleTotals;
//! use stockwise_core::money::Money;
//!
//! // 2 × $5.00 + 1 × $10.00, 10% off
//! let subtotal = Money::from_cents(500).multiply_quantity(2) + Money::from_cents(1000);
//! let totals = SaleTotals::compute(subtotal, subtotal.percentage_of(1000), 0);
//! assert_eq!(totals.total.cents(), 1800);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dto;
pub mod error;
pub mod identity;
pub mod invoice;
pub mod money;
pub mod promotion;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use dto::*;
pub use error::{CoreError, CoreResult, PromotionRejection, ValidationError};
pub use identity::{CheckoutScope, Identity, Role};
pub use money::Money;
pub use promotion::{PromotionContext, PromotionValidator};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines in a single cart or offline record.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on a single line.
///
/// Catches typos (1000 instead of 10) before they reach stock.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Upper bound on identifier length (ids, local ids).
pub const MAX_LOCAL_ID_LEN: usize = 128;

pub const MAX_NOTES_LEN: usize = 1000;

/// Highest unit price a client may send ($10,000,000.00).
///
/// Keeps `price × quantity × lines` far inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Default cap on records per sync batch.
pub const DEFAULT_MAX_SYNC_BATCH: usize = 500;
