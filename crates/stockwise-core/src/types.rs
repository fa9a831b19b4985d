//! # Domain Types
//!
//! Entities persisted by the sale-transaction and stock-consistency engine.
//!
//! ## Entity Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Shop ──< ShopStock >── CatalogItem          Promotion (read-only)    │
//! │                │                                                        │
//! │                │ every mutation writes one                              │
//! │                ▼                                                        │
//! │          StockMovement (append-only)                                    │
//! │                                                                         │
//! │   Sale ──< SaleItem          Sale ── Invoice (1:1, same transaction)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale, SaleItem, Invoice and StockMovement are written once and never
//! updated. ShopStock is the only row mutated repeatedly.
//!
//! Monetary columns are integer cents (`*_cents`); accessors return [`Money`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Enumerations
// =============================================================================

/// Why a ShopStock quantity changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Sale,
    StockIn,
    Adjustment,
    TransferIn,
    TransferOut,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Sale => "sale",
            MovementType::StockIn => "stock_in",
            MovementType::Adjustment => "adjustment",
            MovementType::TransferIn => "transfer_in",
            MovementType::TransferOut => "transfer_out",
        }
    }
}

/// How the customer paid. Capture itself happens outside this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    Card,
    MobileMoney,
    /// Sold on account; settled later.
    Credit,
}

impl PaymentType {
    /// Payment status recorded on the Sale and Invoice at checkout time.
    pub fn initial_status(&self) -> PaymentStatus {
        match self {
            PaymentType::Credit => PaymentStatus::Pending,
            _ => PaymentStatus::Paid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PromotionType {
    /// `value` is in basis points (1000 = 10%).
    Percentage,
    /// `value` is in cents.
    FixedAmount,
}

// =============================================================================
// Catalog Directory
// =============================================================================

/// A point-of-sale location owned by a merchant.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub merchant_id: String,
    pub name: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Merchant catalog entry. Snapshotted onto SaleItem at sale time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub merchant_id: String,
    pub sku: String,
    pub name: String,
    /// Current selling price in cents.
    pub price_cents: i64,
    /// Current cost in cents, when known.
    pub cost_cents: Option<i64>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Current quantity of one item at one shop.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShopStock {
    pub shop_id: String,
    pub item_id: String,
    /// Never negative (enforced by the conditional decrement and a CHECK).
    pub quantity: i64,
    #[ts(as = "Option<String>")]
    pub last_stocked_in_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Immutable ledger entry, written in the same transaction as the
/// ShopStock change it describes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub item_id: String,
    pub shop_id: String,
    pub user_id: String,
    pub movement_type: MovementType,
    /// Signed: negative for sales and outbound transfers.
    pub quantity_changed: i64,
    /// ShopStock.quantity right after this movement committed.
    pub new_quantity_after: i64,
    pub reason: Option<String>,
    /// Sale id or transfer id this movement belongs to.
    pub reference_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Promotion
// =============================================================================

/// A merchant promotion. Managed elsewhere; read-only during checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: String,
    pub merchant_id: String,
    /// `None` means the promotion applies to every shop of the merchant.
    pub shop_id: Option<String>,
    pub name: String,
    pub promotion_type: PromotionType,
    pub value: i64,
    pub min_spend_cents: i64,
    #[ts(as = "Option<String>")]
    pub start_date: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub merchant_id: String,
    pub shop_id: String,
    /// Set when the sale was rung up by a staff member.
    pub staff_id: Option<String>,
    pub customer_id: Option<String>,
    /// Actor that recorded the sale.
    pub created_by: String,
    /// When the sale happened (device time for offline sales).
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    /// Final amount: subtotal − discount.
    pub total_cents: i64,
    pub applied_promotion_id: Option<String>,
    pub payment_type: PaymentType,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    /// Client idempotency key for offline sales.
    pub local_id: Option<String>,
    pub device_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }
}

/// A line item. Uses the snapshot pattern so later catalog edits never
/// rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub item_id: String,
    /// Item name at time of sale (frozen).
    pub item_name: String,
    /// SKU at time of sale (frozen).
    pub sku: String,
    pub quantity_sold: i64,
    /// Unit price actually charged.
    pub selling_price_cents: i64,
    /// Catalog price at time of sale, when it differs from what was charged.
    pub original_price_cents: Option<i64>,
    /// Catalog cost at time of sale.
    pub cost_price_cents: Option<i64>,
    /// selling_price × quantity_sold.
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// Billing document, 1:1 with a Sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub sale_id: String,
    pub invoice_number: String,
    pub merchant_id: String,
    pub shop_id: String,
    pub customer_id: Option<String>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    /// Tax contained in `total_cents` (prices are tax-inclusive).
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payment_status: PaymentStatus,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
}

/// A sale together with its line items and invoice, as returned by checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub invoice: Invoice,
}
