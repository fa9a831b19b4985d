//! # stockwise-engine: Sale Transactions and Offline Sync
//!
//! Owns every transaction boundary. Nothing above this crate opens a
//! transaction; nothing below it decides when to commit.
//!
//! ## Components
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Engine                                                                 │
//! │   ├── SaleTransactionProcessor   checkout: one transaction, all or none │
//! │   ├── OfflineSyncReconciler      batch: one savepoint per record        │
//! │   └── InventoryService           stock-in, adjustment, transfer, reads  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockwise_core::Identity;
//! use stockwise_db::{Database, DbConfig};
//! use stockwise_engine::{Engine, EngineConfig};
//!
//! let db = Database::new(DbConfig::new("./stockwise.db")).await?;
//! let engine = Engine::new(db, EngineConfig::default());
//!
//! let scope = Identity::staff(merchant_id, staff_id, shop_id).checkout_scope(None)?;
//! let completed = engine.processor().checkout(&scope, request).await?;
//! println!("{}", completed.invoice.invoice_number);
//! ```

pub mod checkout;
pub mod config;
pub mod error;
pub mod inventory;
pub mod reconcile;

use std::sync::Arc;

use stockwise_db::Database;

pub use checkout::{SaleInput, SaleTransactionProcessor};
pub use config::EngineConfig;
pub use error::{SaleError, SaleResult};
pub use inventory::InventoryService;
pub use reconcile::OfflineSyncReconciler;

/// The three services wired to one database and one config.
#[derive(Debug, Clone)]
pub struct Engine {
    processor: SaleTransactionProcessor,
    reconciler: OfflineSyncReconciler,
    inventory: InventoryService,
}

impl Engine {
    pub fn new(db: Database, config: EngineConfig) -> Self {
        let config = Arc::new(config);
        let processor = SaleTransactionProcessor::new(db.clone(), config.clone());
        Engine {
            reconciler: OfflineSyncReconciler::new(db.clone(), processor.clone(), config.clone()),
            inventory: InventoryService::new(db, config),
            processor,
        }
    }

    pub fn processor(&self) -> &SaleTransactionProcessor {
        &self.processor
    }

    pub fn reconciler(&self) -> &OfflineSyncReconciler {
        &self.reconciler
    }

    pub fn inventory(&self) -> &InventoryService {
        &self.inventory
    }
}
