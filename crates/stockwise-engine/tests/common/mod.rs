//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use stockwise_core::{
    CatalogItem, CheckoutLine, CheckoutRequest, OfflineSaleLine, OfflineSaleRecord, PaymentType,
    Promotion, PromotionType, SyncBatchRequest,
};
use stockwise_db::{Database, DbConfig};
use stockwise_engine::{Engine, EngineConfig};

pub struct Store {
    pub db: Database,
    pub engine: Engine,
    pub merchant: String,
    pub shop: String,
    pub other_shop: String,
    /// Price 5.00, 10 on hand at `shop`.
    pub item_a: CatalogItem,
    /// Price 10.00, 5 on hand at `shop`.
    pub item_b: CatalogItem,
    _file: Option<TempDbFile>,
}

/// Removes a file-backed test database and its WAL companions on drop.
struct TempDbFile(PathBuf);

impl Drop for TempDbFile {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.0.display(), suffix));
        }
    }
}

pub async fn store() -> Store {
    store_with(EngineConfig::default()).await
}

pub async fn store_with(config: EngineConfig) -> Store {
    store_on(DbConfig::in_memory(), config, None).await
}

/// A store on a temporary database file with a multi-connection pool, so
/// concurrent tasks really run side by side against SQLite's locking.
pub async fn file_store() -> Store {
    let path = std::env::temp_dir().join(format!("stockwise-engine-{}.db", Uuid::new_v4()));
    let config = DbConfig::new(&path).max_connections(5);
    store_on(config, EngineConfig::default(), Some(TempDbFile(path))).await
}

async fn store_on(db_config: DbConfig, config: EngineConfig, file: Option<TempDbFile>) -> Store {
    let db = Database::new(db_config).await.unwrap();
    let catalog = db.catalog();

    let merchant = catalog.insert_merchant("Corner Store").await.unwrap();
    let shop = catalog.insert_shop(&merchant, "Main").await.unwrap().id;
    let other_shop = catalog.insert_shop(&merchant, "Kiosk").await.unwrap().id;
    let item_a = catalog
        .insert_item(&merchant, "A-001", "Item A", 500, Some(300))
        .await
        .unwrap();
    let item_b = catalog
        .insert_item(&merchant, "B-001", "Item B", 1000, Some(650))
        .await
        .unwrap();

    set_stock(&db, &shop, &item_a.id, 10).await;
    set_stock(&db, &shop, &item_b.id, 5).await;

    let engine = Engine::new(db.clone(), config);
    Store {
        db,
        engine,
        merchant,
        shop,
        other_shop,
        item_a,
        item_b,
        _file: file,
    }
}

/// Writes opening stock directly through the ledger.
pub async fn set_stock(db: &Database, shop: &str, item: &str, qty: i64) {
    let mut tx = db.begin().await.unwrap();
    db.stock().increment(&mut tx, shop, item, qty, None).await.unwrap();
    tx.commit().await.unwrap();
}

pub async fn quantity(db: &Database, shop: &str, item: &str) -> i64 {
    db.stock()
        .get(shop, item)
        .await
        .unwrap()
        .map(|s| s.quantity)
        .unwrap_or(0)
}

pub async fn promotion(db: &Database, merchant: &str, f: impl FnOnce(&mut Promotion)) -> String {
    let mut promo = Promotion {
        id: Uuid::new_v4().to_string(),
        merchant_id: merchant.to_string(),
        shop_id: None,
        name: "Ten percent".to_string(),
        promotion_type: PromotionType::Percentage,
        value: 1000,
        min_spend_cents: 0,
        start_date: None,
        end_date: None,
        is_active: true,
        created_at: Utc::now(),
    };
    f(&mut promo);
    db.promotions().insert(&promo).await.unwrap();
    promo.id
}

pub fn cart(lines: &[(&str, i64)]) -> CheckoutRequest {
    CheckoutRequest {
        shop_id: None,
        items: lines
            .iter()
            .map(|(item, qty)| CheckoutLine {
                item_id: item.to_string(),
                quantity: *qty,
                unit_price_cents: None,
            })
            .collect(),
        payment_type: PaymentType::Cash,
        promotion_id: None,
        customer_id: None,
        notes: None,
    }
}

pub fn offline(local_id: &str, shop: &str, lines: &[(&str, i64)], total_cents: i64) -> OfflineSaleRecord {
    OfflineSaleRecord {
        local_id: local_id.to_string(),
        shop_id: shop.to_string(),
        items: lines
            .iter()
            .map(|(item, qty)| OfflineSaleLine {
                item_id: item.to_string(),
                quantity: *qty,
            })
            .collect(),
        total_amount_cents: total_cents,
        payment_type: PaymentType::Cash,
        timestamp: minutes_ago(30),
        customer_id: None,
        notes: None,
    }
}

pub fn batch(batch_id: &str, sales: Vec<OfflineSaleRecord>) -> SyncBatchRequest {
    SyncBatchRequest {
        batch_id: batch_id.to_string(),
        device_id: "till-01".to_string(),
        sales,
    }
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    Utc::now() - chrono::Duration::minutes(minutes)
}

pub fn short_deadline() -> EngineConfig {
    EngineConfig::default().request_timeout(Duration::from_millis(200))
}
