//! # Sale Repository
//!
//! Writes and reads sales, their line items and invoices.
//!
//! ## Write Order (one transaction)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert_sale     → sales        (local_id = idempotency marker)         │
//! │  insert_item × N → sale_items   (name/sku/price snapshots)              │
//! │  insert_invoice  → invoices     (UNIQUE sale_id, UNIQUE number)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are never updated or deleted afterwards.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockwise_core::{CompletedSale, Invoice, Sale, SaleItem};

const SALE_COLUMNS: &str = r#"
    id, merchant_id, shop_id, staff_id, customer_id, created_by, sale_date,
    subtotal_cents, discount_cents, total_cents, applied_promotion_id,
    payment_type, payment_status, notes, local_id, device_id, created_at
"#;

const SALE_ITEM_COLUMNS: &str = r#"
    id, sale_id, item_id, item_name, sku, quantity_sold, selling_price_cents,
    original_price_cents, cost_price_cents, subtotal_cents, created_at
"#;

const INVOICE_COLUMNS: &str = r#"
    id, sale_id, invoice_number, merchant_id, shop_id, customer_id,
    subtotal_cents, discount_cents, tax_cents, total_cents, payment_status, issued_at
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Writes (inside the caller's transaction)
    // =========================================================================

    pub async fn insert_sale(&self, conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, shop_id = %sale.shop_id, total_cents = sale.total_cents, "Inserting sale");

        sqlx::query(&format!(
            "INSERT INTO sales ({SALE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
        ))
        .bind(&sale.id)
        .bind(&sale.merchant_id)
        .bind(&sale.shop_id)
        .bind(&sale.staff_id)
        .bind(&sale.customer_id)
        .bind(&sale.created_by)
        .bind(sale.sale_date)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(&sale.applied_promotion_id)
        .bind(sale.payment_type)
        .bind(sale.payment_status)
        .bind(&sale.notes)
        .bind(&sale.local_id)
        .bind(&sale.device_id)
        .bind(sale.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Adds a line item.
    ///
    /// ## Snapshot Pattern
    /// Name, sku and prices are copied onto the line so the sale history
    /// survives later catalog edits.
    pub async fn insert_item(&self, conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
        debug!(sale_id = %item.sale_id, item_id = %item.item_id, qty = item.quantity_sold, "Inserting sale item");

        sqlx::query(&format!(
            "INSERT INTO sale_items ({SALE_ITEM_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ))
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.item_id)
        .bind(&item.item_name)
        .bind(&item.sku)
        .bind(item.quantity_sold)
        .bind(item.selling_price_cents)
        .bind(item.original_price_cents)
        .bind(item.cost_price_cents)
        .bind(item.subtotal_cents)
        .bind(item.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn insert_invoice(&self, conn: &mut SqliteConnection, invoice: &Invoice) -> DbResult<()> {
        debug!(sale_id = %invoice.sale_id, number = %invoice.invoice_number, "Inserting invoice");

        sqlx::query(&format!(
            "INSERT INTO invoices ({INVOICE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ))
        .bind(&invoice.id)
        .bind(&invoice.sale_id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.merchant_id)
        .bind(&invoice.shop_id)
        .bind(&invoice.customer_id)
        .bind(invoice.subtotal_cents)
        .bind(invoice.discount_cents)
        .bind(invoice.tax_cents)
        .bind(invoice.total_cents)
        .bind(invoice.payment_status)
        .bind(invoice.issued_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Looks up the sale recorded for an offline `local_id`.
    pub async fn find_by_local_id(
        &self,
        conn: &mut SqliteConnection,
        merchant_id: &str,
        local_id: &str,
    ) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE merchant_id = ?1 AND local_id = ?2"
        ))
        .bind(merchant_id)
        .bind(local_id)
        .fetch_optional(conn)
        .await?;

        Ok(sale)
    }

    /// Gets a sale with its items and invoice, scoped to `merchant_id`.
    pub async fn get_completed(
        &self,
        merchant_id: &str,
        sale_id: &str,
    ) -> DbResult<Option<CompletedSale>> {
        let mut conn = self.pool.acquire().await?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1 AND merchant_id = ?2"
        ))
        .bind(sale_id)
        .bind(merchant_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid"
        ))
        .bind(sale_id)
        .fetch_all(&mut *conn)
        .await?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE sale_id = ?1"
        ))
        .bind(sale_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(Some(CompletedSale { sale, items, invoice }))
    }

    pub async fn count_sales(&self) -> DbResult<i64> {
        self.count("sales").await
    }

    pub async fn count_sale_items(&self) -> DbResult<i64> {
        self.count("sale_items").await
    }

    pub async fn count_invoices(&self) -> DbResult<i64> {
        self.count("invoices").await
    }

    async fn count(&self, table: &'static str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, DbError};
    use chrono::Utc;
    use stockwise_core::{PaymentStatus, PaymentType};

    fn sale(id: &str, merchant: &str, shop: &str, local_id: Option<&str>) -> Sale {
        let now = Utc::now();
        Sale {
            id: id.to_string(),
            merchant_id: merchant.to_string(),
            shop_id: shop.to_string(),
            staff_id: None,
            customer_id: None,
            created_by: merchant.to_string(),
            sale_date: now,
            subtotal_cents: 1000,
            discount_cents: 100,
            total_cents: 900,
            applied_promotion_id: None,
            payment_type: PaymentType::Card,
            payment_status: PaymentStatus::Paid,
            notes: None,
            local_id: local_id.map(str::to_string),
            device_id: None,
            created_at: now,
        }
    }

    fn invoice(id: &str, sale: &Sale, number: &str) -> Invoice {
        Invoice {
            id: id.to_string(),
            sale_id: sale.id.clone(),
            invoice_number: number.to_string(),
            merchant_id: sale.merchant_id.clone(),
            shop_id: sale.shop_id.clone(),
            customer_id: None,
            subtotal_cents: sale.subtotal_cents,
            discount_cents: sale.discount_cents,
            tax_cents: 0,
            total_cents: sale.total_cents,
            payment_status: sale.payment_status,
            issued_at: sale.created_at,
        }
    }

    async fn setup() -> (Database, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let merchant = db.catalog().insert_merchant("M").await.unwrap();
        let shop = db.catalog().insert_shop(&merchant, "S").await.unwrap();
        (db, merchant, shop.id)
    }

    #[tokio::test]
    async fn test_round_trip_completed_sale() {
        let (db, merchant, shop) = setup().await;
        let item = db.catalog().insert_item(&merchant, "A", "A", 500, Some(300)).await.unwrap();
        let repo = db.sales();

        let s = sale("sale-1", &merchant, &shop, None);
        let line = SaleItem {
            id: "line-1".to_string(),
            sale_id: s.id.clone(),
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            sku: item.sku.clone(),
            quantity_sold: 2,
            selling_price_cents: 500,
            original_price_cents: None,
            cost_price_cents: Some(300),
            subtotal_cents: 1000,
            created_at: Utc::now(),
        };

        let mut tx = db.begin().await.unwrap();
        repo.insert_sale(&mut tx, &s).await.unwrap();
        repo.insert_item(&mut tx, &line).await.unwrap();
        repo.insert_invoice(&mut tx, &invoice("inv-1", &s, "INV-00000001")).await.unwrap();
        tx.commit().await.unwrap();

        let loaded = repo.get_completed(&merchant, "sale-1").await.unwrap().unwrap();
        assert_eq!(loaded.sale.total_cents, 900);
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.invoice.invoice_number, "INV-00000001");

        // Another merchant cannot read it.
        assert!(repo.get_completed("other", "sale-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_local_id_unique_per_merchant() {
        let (db, merchant, shop) = setup().await;
        let repo = db.sales();

        let mut tx = db.begin().await.unwrap();
        repo.insert_sale(&mut tx, &sale("s1", &merchant, &shop, Some("L1"))).await.unwrap();
        // Online sales have no local id and never collide.
        repo.insert_sale(&mut tx, &sale("s2", &merchant, &shop, None)).await.unwrap();
        repo.insert_sale(&mut tx, &sale("s3", &merchant, &shop, None)).await.unwrap();

        let err = repo
            .insert_sale(&mut tx, &sale("s4", &merchant, &shop, Some("L1")))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(err.is_unique_violation_on("local_id"));

        let found = repo.find_by_local_id(&mut tx, &merchant, "L1").await.unwrap().unwrap();
        assert_eq!(found.id, "s1");
    }

    #[tokio::test]
    async fn test_one_invoice_per_sale() {
        let (db, merchant, shop) = setup().await;
        let repo = db.sales();
        let s = sale("s1", &merchant, &shop, None);

        let mut tx = db.begin().await.unwrap();
        repo.insert_sale(&mut tx, &s).await.unwrap();
        repo.insert_invoice(&mut tx, &invoice("i1", &s, "INV-1")).await.unwrap();
        let err = repo.insert_invoice(&mut tx, &invoice("i2", &s, "INV-2")).await.unwrap_err();
        assert!(err.is_unique_violation_on("sale_id"));
    }
}
