//! # Sale Transaction Processor
//!
//! One checkout, one database transaction, all or nothing.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. shop exists, belongs to merchant        ShopNotFound / AccessDenied│
//! │   2. each line: item in merchant catalog     ItemNotFound               │
//! │      snapshot name, sku, price, cost                                    │
//! │   3. promotion (if any) → discount           InvalidPromotion           │
//! │   ── nothing written before this line ──                                │
//! │   4. each line: guarded decrement + movement InsufficientStock          │
//! │   5. insert Sale (total = Σ subtotal − discount)                        │
//! │   6. insert SaleItem × N                                                │
//! │   7. next invoice number, insert Invoice     InvoiceNumberUnavailable   │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error drops the transaction, which rolls back every write above.
//! The whole operation runs under `EngineConfig::request_timeout`; expiry
//! drops the future and with it the transaction.
//!
//! Steps 1 to 7 live in [`SaleTransactionProcessor::apply`], which runs on
//! any connection. `checkout` wraps it in its own transaction; the offline
//! reconciler runs it on a savepoint.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use stockwise_core::invoice::{format_invoice_number, SaleTotals};
use stockwise_core::validation::{validate_cart, validate_notes};
use stockwise_core::{
    CatalogItem, CheckoutLine, CheckoutRequest, CheckoutScope, CompletedSale, CoreError, Identity,
    Invoice, Money, MovementType, PaymentType, PromotionContext, PromotionValidator, Sale,
    SaleItem, Shop, ValidationError,
};
use stockwise_db::{
    CatalogRepository, Database, DbError, Decrement, InvoiceSequence, NewMovement,
    PromotionRepository, SaleRepository, StockLedger,
};

use crate::config::EngineConfig;
use crate::error::{SaleError, SaleResult};

/// Normalised input shared by online checkout and offline sync.
#[derive(Debug, Clone)]
pub struct SaleInput {
    pub lines: Vec<CheckoutLine>,
    pub payment_type: PaymentType,
    pub promotion_id: Option<String>,
    pub customer_id: Option<String>,
    pub notes: Option<String>,
    /// When the sale happened. Device time for offline sales.
    pub sale_date: DateTime<Utc>,
    /// Offline idempotency key.
    pub local_id: Option<String>,
    pub device_id: Option<String>,
}

impl SaleInput {
    pub fn from_checkout(request: CheckoutRequest, now: DateTime<Utc>) -> Self {
        SaleInput {
            lines: request.items,
            payment_type: request.payment_type,
            promotion_id: request.promotion_id,
            customer_id: request.customer_id,
            notes: request.notes,
            sale_date: now,
            local_id: None,
            device_id: None,
        }
    }
}

/// A line after catalog lookup, before any write.
struct PricedLine<'a> {
    line: &'a CheckoutLine,
    item: CatalogItem,
    selling_price: Money,
    line_total: Money,
}

#[derive(Debug, Clone)]
pub struct SaleTransactionProcessor {
    db: Database,
    stock: StockLedger,
    catalog: CatalogRepository,
    promotions: PromotionRepository,
    sales: SaleRepository,
    invoices: InvoiceSequence,
    config: Arc<EngineConfig>,
}

impl SaleTransactionProcessor {
    pub fn new(db: Database, config: Arc<EngineConfig>) -> Self {
        SaleTransactionProcessor {
            stock: db.stock(),
            catalog: db.catalog(),
            promotions: db.promotions(),
            sales: db.sales(),
            invoices: db.invoice_sequence(),
            db,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Records a sale for `scope`.
    ///
    /// ## Errors
    /// - `Domain(InsufficientStock | ItemNotFound | ShopNotFound |
    ///   ShopAccessDenied | InvalidPromotion | Validation)`
    /// - `Database` for infrastructure faults (retryable)
    /// - `TimedOut` when the deadline passes first
    ///
    /// In every error case nothing was written.
    pub async fn checkout(
        &self,
        scope: &CheckoutScope,
        request: CheckoutRequest,
    ) -> SaleResult<CompletedSale> {
        validate_cart(&request.items)?;
        validate_notes(request.notes.as_deref())?;

        let input = SaleInput::from_checkout(request, Utc::now());

        with_deadline(&self.config, async {
            let mut tx = self.db.begin().await?;
            let completed = self.apply(&mut tx, scope, &input).await?;
            tx.commit()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

            info!(
                sale_id = %completed.sale.id,
                shop_id = %completed.sale.shop_id,
                total_cents = completed.sale.total_cents,
                invoice_number = %completed.invoice.invoice_number,
                "Checkout committed"
            );
            Ok(completed)
        })
        .await
    }

    /// Runs steps 1 to 7 on `conn`. The caller owns commit and rollback.
    pub async fn apply(
        &self,
        conn: &mut SqliteConnection,
        scope: &CheckoutScope,
        input: &SaleInput,
    ) -> SaleResult<CompletedSale> {
        let now = Utc::now();

        // 1. Shop ownership
        authorize_shop(&self.catalog, conn, &scope.merchant_id, &scope.shop_id).await?;

        // 2. Catalog snapshots
        let mut priced = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let item = self
                .catalog
                .item_for_merchant(conn, &scope.merchant_id, &line.item_id)
                .await?
                .ok_or_else(|| CoreError::ItemNotFound(line.item_id.clone()))?;
            let selling_price = line
                .unit_price_cents
                .map(Money::from_cents)
                .unwrap_or_else(|| item.price());
            let line_total = selling_price
                .checked_multiply_quantity(line.quantity)
                .ok_or_else(amount_out_of_range)?;
            priced.push(PricedLine {
                line,
                item,
                selling_price,
                line_total,
            });
        }

        let subtotal = priced
            .iter()
            .try_fold(Money::zero(), |acc, p| acc.checked_add(p.line_total))
            .ok_or_else(amount_out_of_range)?;

        // 3. Promotion
        let discount = match input.promotion_id.as_deref() {
            Some(promotion_id) => {
                let promotion = self.promotions.get(conn, promotion_id).await?;
                PromotionValidator::validate(
                    Some(promotion_id),
                    promotion.as_ref(),
                    &PromotionContext {
                        merchant_id: &scope.merchant_id,
                        shop_id: &scope.shop_id,
                        subtotal,
                        now,
                    },
                )?
            }
            None => Money::zero(),
        };

        // 4. Stock
        let sale_id = Uuid::new_v4().to_string();
        for p in &priced {
            match self
                .stock
                .decrement(conn, &scope.shop_id, &p.item.id, p.line.quantity)
                .await?
            {
                Decrement::Applied { new_quantity } => {
                    self.stock
                        .record_movement(
                            conn,
                            NewMovement {
                                shop_id: &scope.shop_id,
                                item_id: &p.item.id,
                                user_id: &scope.actor_id,
                                movement_type: MovementType::Sale,
                                quantity_changed: -p.line.quantity,
                                new_quantity_after: new_quantity,
                                reason: None,
                                reference_id: Some(&sale_id),
                            },
                        )
                        .await?;
                }
                Decrement::Insufficient { available } => {
                    debug!(
                        shop_id = %scope.shop_id,
                        item_id = %p.item.id,
                        available,
                        requested = p.line.quantity,
                        "Checkout aborted on stock guard"
                    );
                    return Err(CoreError::InsufficientStock {
                        item_id: p.item.id.clone(),
                        sku: p.item.sku.clone(),
                        available,
                        requested: p.line.quantity,
                    }
                    .into());
                }
            }
        }

        // 5. Sale
        let totals = SaleTotals::compute(subtotal, discount, self.config.invoice_tax_rate_bps);
        let payment_status = input.payment_type.initial_status();
        let sale = Sale {
            id: sale_id.clone(),
            merchant_id: scope.merchant_id.clone(),
            shop_id: scope.shop_id.clone(),
            staff_id: scope.staff_id.clone(),
            customer_id: input.customer_id.clone(),
            created_by: scope.actor_id.clone(),
            sale_date: input.sale_date,
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
            applied_promotion_id: input
                .promotion_id
                .clone()
                .filter(|_| discount.is_positive()),
            payment_type: input.payment_type,
            payment_status,
            notes: input.notes.clone(),
            local_id: input.local_id.clone(),
            device_id: input.device_id.clone(),
            created_at: now,
        };
        self.sales.insert_sale(conn, &sale).await?;

        // 6. Line items
        let mut items = Vec::with_capacity(priced.len());
        for p in priced {
            let catalog_price = p.item.price_cents;
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                item_id: p.item.id,
                item_name: p.item.name,
                sku: p.item.sku,
                quantity_sold: p.line.quantity,
                selling_price_cents: p.selling_price.cents(),
                original_price_cents: (p.selling_price.cents() != catalog_price)
                    .then_some(catalog_price),
                cost_price_cents: p.item.cost_cents,
                subtotal_cents: p.line_total.cents(),
                created_at: now,
            };
            self.sales.insert_item(conn, &item).await?;
            items.push(item);
        }

        // 7. Invoice
        let seq = self
            .invoices
            .next(conn)
            .await
            .map_err(|e| CoreError::InvoiceNumberUnavailable(e.to_string()))?;
        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.clone(),
            invoice_number: format_invoice_number(&self.config.invoice_prefix, seq),
            merchant_id: scope.merchant_id.clone(),
            shop_id: scope.shop_id.clone(),
            customer_id: input.customer_id.clone(),
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.cents(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
            payment_status,
            issued_at: now,
        };
        self.sales.insert_invoice(conn, &invoice).await?;

        debug!(sale_id = %sale.id, lines = items.len(), "Sale written");
        Ok(CompletedSale {
            sale,
            items,
            invoice,
        })
    }

    /// Reads a committed sale with its items and invoice.
    ///
    /// Staff and shop principals only see sales of their own shop.
    pub async fn get_sale(&self, identity: &Identity, sale_id: &str) -> SaleResult<CompletedSale> {
        let completed = self
            .sales
            .get_completed(&identity.merchant_id, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        identity.checkout_scope(Some(completed.sale.shop_id.as_str()))?;
        Ok(completed)
    }
}

/// Loads the shop and checks it belongs to `merchant_id`.
///
/// Inactive shops are reported as missing.
pub(crate) async fn authorize_shop(
    catalog: &CatalogRepository,
    conn: &mut SqliteConnection,
    merchant_id: &str,
    shop_id: &str,
) -> SaleResult<Shop> {
    let shop = catalog
        .shop(conn, shop_id)
        .await?
        .filter(|s| s.is_active)
        .ok_or_else(|| CoreError::ShopNotFound(shop_id.to_string()))?;

    if shop.merchant_id != merchant_id {
        return Err(CoreError::ShopAccessDenied {
            shop_id: shop_id.to_string(),
        }
        .into());
    }

    Ok(shop)
}

/// Catalog prices are not capped like client prices, so line and cart
/// totals are computed with checked arithmetic.
fn amount_out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "subtotal".to_string(),
        min: 0,
        max: i64::MAX,
    }
}

/// Runs `op` under the configured request deadline.
pub(crate) async fn with_deadline<T, F>(config: &EngineConfig, op: F) -> SaleResult<T>
where
    F: Future<Output = SaleResult<T>>,
{
    tokio::time::timeout(config.request_timeout, op)
        .await
        .map_err(|_| SaleError::TimedOut(config.request_timeout))?
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stockwise_db::DbConfig;

    struct Fixture {
        db: Database,
        processor: SaleTransactionProcessor,
        merchant: String,
        shop: String,
        item_a: CatalogItem,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let merchant = db.catalog().insert_merchant("M").await.unwrap();
        let shop = db.catalog().insert_shop(&merchant, "S").await.unwrap();
        let item_a = db
            .catalog()
            .insert_item(&merchant, "A", "Item A", 500, Some(300))
            .await
            .unwrap();

        let mut tx = db.begin().await.unwrap();
        db.stock().increment(&mut tx, &shop.id, &item_a.id, 10, None).await.unwrap();
        tx.commit().await.unwrap();

        let processor = SaleTransactionProcessor::new(db.clone(), Arc::new(EngineConfig::default()));
        Fixture {
            db,
            processor,
            merchant,
            shop: shop.id,
            item_a,
        }
    }

    fn request(item: &str, qty: i64, unit_price_cents: Option<i64>) -> CheckoutRequest {
        CheckoutRequest {
            shop_id: None,
            items: vec![CheckoutLine {
                item_id: item.to_string(),
                quantity: qty,
                unit_price_cents,
            }],
            payment_type: PaymentType::Cash,
            promotion_id: None,
            customer_id: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_client_price_keeps_catalog_snapshot() {
        let f = fixture().await;
        let scope = Identity::merchant(&f.merchant).checkout_scope(Some(f.shop.as_str())).unwrap();

        let done = f
            .processor
            .checkout(&scope, request(&f.item_a.id, 2, Some(450)))
            .await
            .unwrap();

        let line = &done.items[0];
        assert_eq!(line.selling_price_cents, 450);
        assert_eq!(line.original_price_cents, Some(500));
        assert_eq!(line.cost_price_cents, Some(300));
        assert_eq!(done.sale.total_cents, 900);
        assert_eq!(done.invoice.invoice_number, "INV-00000001");
    }

    #[tokio::test]
    async fn test_credit_sale_is_pending() {
        let f = fixture().await;
        let scope = Identity::merchant(&f.merchant).checkout_scope(Some(f.shop.as_str())).unwrap();

        let mut req = request(&f.item_a.id, 1, None);
        req.payment_type = PaymentType::Credit;
        let done = f.processor.checkout(&scope, req).await.unwrap();

        assert_eq!(done.sale.payment_status, stockwise_core::PaymentStatus::Pending);
        assert_eq!(done.invoice.payment_status, stockwise_core::PaymentStatus::Pending);
        assert!(done.items[0].original_price_cents.is_none());
    }

    #[tokio::test]
    async fn test_foreign_shop_denied_before_any_write() {
        let f = fixture().await;
        let other = f.db.catalog().insert_merchant("Other").await.unwrap();
        let scope = Identity::merchant(&other).checkout_scope(Some(f.shop.as_str())).unwrap();

        let err = f
            .processor
            .checkout(&scope, request(&f.item_a.id, 1, None))
            .await
            .unwrap_err();
        assert!(matches!(err, SaleError::Domain(CoreError::ShopAccessDenied { .. })));
        assert_eq!(f.db.stock().count_movements().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let f = fixture().await;
        let scope = Identity::merchant(&f.merchant).checkout_scope(Some(f.shop.as_str())).unwrap();

        let mut req = request(&f.item_a.id, 1, None);
        req.items.clear();
        let err = f.processor.checkout(&scope, req).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_staff_sale_records_staff_and_reads_back() {
        let f = fixture().await;
        let staff = Identity::staff(&f.merchant, "staff-7", &f.shop);
        let scope = staff.checkout_scope(None).unwrap();

        let done = f
            .processor
            .checkout(&scope, request(&f.item_a.id, 1, None))
            .await
            .unwrap();
        assert_eq!(done.sale.staff_id.as_deref(), Some("staff-7"));
        assert_eq!(done.sale.created_by, "staff-7");

        let read = f.processor.get_sale(&staff, &done.sale.id).await.unwrap();
        assert_eq!(read.invoice.id, done.invoice.id);

        let stranger = Identity::merchant("someone-else");
        let err = f.processor.get_sale(&stranger, &done.sale.id).await.unwrap_err();
        assert_eq!(err.code(), "SALE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_inflated_client_price_rejected() {
        let f = fixture().await;
        let scope = Identity::merchant(&f.merchant).checkout_scope(Some(f.shop.as_str())).unwrap();

        let err = f
            .processor
            .checkout(&scope, request(&f.item_a.id, 3, Some(i64::MAX / 2)))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(f.db.stock().count_movements().await.unwrap(), 0);
        assert_eq!(f.db.sales().count_sales().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_overflowing_catalog_total_rejected() {
        let f = fixture().await;
        let scope = Identity::merchant(&f.merchant).checkout_scope(Some(f.shop.as_str())).unwrap();
        let pricey = f
            .db
            .catalog()
            .insert_item(&f.merchant, "P", "Pricey", i64::MAX / 2, None)
            .await
            .unwrap();

        let err = f
            .processor
            .checkout(&scope, request(&pricey.id, 3, None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SaleError::Domain(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(f.db.sales().count_sales().await.unwrap(), 0);
    }
}
