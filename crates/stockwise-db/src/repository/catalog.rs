//! # Catalog Repository
//!
//! Shop and item directory: shop → merchant ownership, and the item master
//! data that gets snapshotted onto sale lines.
//!
//! Shops and items are managed outside the engine. The insert methods exist
//! for the seed tool and tests.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use stockwise_core::{CatalogItem, Shop};

const ITEM_COLUMNS: &str = "id, merchant_id, sku, name, price_cents, cost_cents, is_active, created_at, updated_at";

/// Repository for the shop and item directory.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Lookups (inside the caller's transaction)
    // =========================================================================

    /// Gets a shop by id regardless of owner. Ownership is the caller's check.
    pub async fn shop(&self, conn: &mut SqliteConnection, shop_id: &str) -> DbResult<Option<Shop>> {
        let shop = sqlx::query_as::<_, Shop>(
            "SELECT id, merchant_id, name, is_active, created_at FROM shops WHERE id = ?1",
        )
        .bind(shop_id)
        .fetch_optional(conn)
        .await?;

        Ok(shop)
    }

    /// Gets an active item from `merchant_id`'s catalog.
    ///
    /// Items of other merchants are indistinguishable from missing ones.
    pub async fn item_for_merchant(
        &self,
        conn: &mut SqliteConnection,
        merchant_id: &str,
        item_id: &str,
    ) -> DbResult<Option<CatalogItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1 AND merchant_id = ?2 AND is_active = 1"
        );
        let item = sqlx::query_as::<_, CatalogItem>(&sql)
            .bind(item_id)
            .bind(merchant_id)
            .fetch_optional(conn)
            .await?;

        Ok(item)
    }

    // =========================================================================
    // Directory writes (seed + tests)
    // =========================================================================

    pub async fn insert_merchant(&self, name: &str) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        debug!(id = %id, name = %name, "Inserting merchant");

        sqlx::query("INSERT INTO merchants (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&id)
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    pub async fn insert_shop(&self, merchant_id: &str, name: &str) -> DbResult<Shop> {
        let shop = Shop {
            id: Uuid::new_v4().to_string(),
            merchant_id: merchant_id.to_string(),
            name: name.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        debug!(id = %shop.id, merchant_id = %merchant_id, "Inserting shop");

        sqlx::query(
            "INSERT INTO shops (id, merchant_id, name, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&shop.id)
        .bind(&shop.merchant_id)
        .bind(&shop.name)
        .bind(shop.is_active)
        .bind(shop.created_at)
        .execute(&self.pool)
        .await?;

        Ok(shop)
    }

    pub async fn insert_item(
        &self,
        merchant_id: &str,
        sku: &str,
        name: &str,
        price_cents: i64,
        cost_cents: Option<i64>,
    ) -> DbResult<CatalogItem> {
        let now = Utc::now();
        let item = CatalogItem {
            id: Uuid::new_v4().to_string(),
            merchant_id: merchant_id.to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            price_cents,
            cost_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        debug!(id = %item.id, sku = %sku, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, merchant_id, sku, name, price_cents, cost_cents,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.merchant_id)
        .bind(&item.sku)
        .bind(&item.name)
        .bind(item.price_cents)
        .bind(item.cost_cents)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Changes an item's catalog price. Past sale lines keep their snapshot.
    pub async fn update_item_price(&self, item_id: &str, price_cents: i64) -> DbResult<()> {
        sqlx::query("UPDATE items SET price_cents = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(item_id)
            .bind(price_cents)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn count_items(&self, merchant_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE merchant_id = ?1")
            .bind(merchant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_item_scoped_to_merchant() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let m1 = catalog.insert_merchant("One").await.unwrap();
        let m2 = catalog.insert_merchant("Two").await.unwrap();
        let item = catalog
            .insert_item(&m1, "COKE-330", "Coke 330ml", 150, Some(90))
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let found = catalog.item_for_merchant(&mut conn, &m1, &item.id).await.unwrap();
        assert_eq!(found.unwrap().sku, "COKE-330");

        let foreign = catalog.item_for_merchant(&mut conn, &m2, &item.id).await.unwrap();
        assert!(foreign.is_none());
    }

    #[tokio::test]
    async fn test_shop_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let m = catalog.insert_merchant("One").await.unwrap();
        let shop = catalog.insert_shop(&m, "Main Street").await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let found = catalog.shop(&mut conn, &shop.id).await.unwrap().unwrap();
        assert_eq!(found.merchant_id, m);
        assert!(catalog.shop(&mut conn, "missing").await.unwrap().is_none());
    }
}
