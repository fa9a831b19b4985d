//! # stockwise-db: Database Layer for Stockwise
//!
//! SQLite access for the sale-transaction and stock-consistency engine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockwise Data Flow                              │
//! │                                                                         │
//! │  stockwise-engine (checkout, sync, inventory)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockwise-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │   │   │
//! │  │   │               │    │ StockLedger   │    │              │   │   │
//! │  │   │ SqlitePool    │◄───│ Catalog       │    │ 001_initial  │   │   │
//! │  │   │ begin()       │    │ Promotion     │    │ _schema.sql  │   │   │
//! │  │   │               │    │ Sale, Invoice │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL)                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockwise_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./stockwise.db")).await?;
//!
//! let mut tx = db.begin().await?;
//! let outcome = db.stock().decrement(&mut tx, &shop_id, &item_id, 2).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::catalog::CatalogRepository;
pub use repository::invoice::InvoiceSequence;
pub use repository::promotion::PromotionRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::{Decrement, NewMovement, StockLedger};
