//! # Repository Module
//!
//! Database repositories for Stockwise.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  stockwise-engine (owns the transaction)                                │
//! │       │                                                                 │
//! │       │  let mut tx = db.begin().await?;                                │
//! │       │  ledger.decrement(&mut tx, shop, item, qty).await?              │
//! │       ▼                                                                 │
//! │  StockLedger / CatalogRepository / SaleRepository / ...                 │
//! │  ├── writes + in-transaction reads take `&mut SqliteConnection`         │
//! │  └── committed-state reads use the pool                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Taking the connection explicitly lets one checkout span several
//! repositories in a single transaction, and lets a sync record run on a
//! savepoint of the batch transaction.
//!
//! ## Available Repositories
//!
//! - [`StockLedger`](stock::StockLedger) - Conditional decrement, upsert, movements
//! - [`CatalogRepository`](catalog::CatalogRepository) - Shops and items
//! - [`PromotionRepository`](promotion::PromotionRepository) - Promotion lookup
//! - [`SaleRepository`](sale::SaleRepository) - Sales, line items, invoices
//! - [`InvoiceSequence`](invoice::InvoiceSequence) - Invoice counter

pub mod catalog;
pub mod invoice;
pub mod promotion;
pub mod sale;
pub mod stock;
