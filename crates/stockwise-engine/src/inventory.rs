//! # Inventory Service
//!
//! Stock changes that are not sales. Each operation is one transaction
//! pairing every quantity change with its ledger row.
//!
//! | Operation  | Quantity change                 | Movement(s)                  |
//! |------------|---------------------------------|------------------------------|
//! | stock_in   | upsert `+qty`                   | `stock_in`                   |
//! | adjust     | `+delta`, or guarded `-delta`   | `adjustment`                 |
//! | transfer   | guarded `-qty` at source,       | `transfer_out`, `transfer_in`|
//! |            | upsert `+qty` at destination    | sharing one reference id     |

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use stockwise_core::validation::{
    validate_adjustment_delta, validate_id, validate_notes, validate_stock_quantity,
};
use stockwise_core::{
    CheckoutScope, CoreError, Identity, MovementType, ShopStock, StockChange, StockMovement,
    TransferOutcome, ValidationError, MAX_LOCAL_ID_LEN, MAX_NOTES_LEN,
};
use stockwise_db::{CatalogRepository, Database, DbError, Decrement, NewMovement, StockLedger};

use crate::checkout::{authorize_shop, with_deadline};
use crate::config::EngineConfig;
use crate::error::SaleResult;

/// Default and ceiling for ledger reads.
pub const DEFAULT_MOVEMENT_LIMIT: i64 = 50;
pub const MAX_MOVEMENT_LIMIT: i64 = 500;

#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
    stock: StockLedger,
    catalog: CatalogRepository,
    config: Arc<EngineConfig>,
}

impl InventoryService {
    pub fn new(db: Database, config: Arc<EngineConfig>) -> Self {
        InventoryService {
            stock: db.stock(),
            catalog: db.catalog(),
            db,
            config,
        }
    }

    /// Receives `qty` units into the scope's shop.
    pub async fn stock_in(
        &self,
        scope: &CheckoutScope,
        item_id: &str,
        qty: i64,
        reason: Option<&str>,
    ) -> SaleResult<StockChange> {
        validate_id("itemId", item_id, MAX_LOCAL_ID_LEN)?;
        validate_stock_quantity(qty)?;
        validate_notes(reason)?;

        with_deadline(&self.config, async {
            let mut tx = self.db.begin().await?;
            self.authorize_item(&mut tx, scope, &scope.shop_id, item_id).await?;

            let new_quantity = self
                .stock
                .increment(&mut tx, &scope.shop_id, item_id, qty, Some(Utc::now()))
                .await?;
            let movement = self
                .stock
                .record_movement(
                    &mut tx,
                    NewMovement {
                        shop_id: &scope.shop_id,
                        item_id,
                        user_id: &scope.actor_id,
                        movement_type: MovementType::StockIn,
                        quantity_changed: qty,
                        new_quantity_after: new_quantity,
                        reason,
                        reference_id: None,
                    },
                )
                .await?;

            commit(tx).await?;
            info!(shop_id = %scope.shop_id, item_id = %item_id, qty, new_quantity, "Stock received");
            Ok(change(movement))
        })
        .await
    }

    /// Applies a signed correction. Removals use the same guard as sales,
    /// so an adjustment never takes a quantity below zero.
    pub async fn adjust(
        &self,
        scope: &CheckoutScope,
        item_id: &str,
        delta: i64,
        reason: &str,
    ) -> SaleResult<StockChange> {
        validate_id("itemId", item_id, MAX_LOCAL_ID_LEN)?;
        validate_adjustment_delta(delta)?;
        validate_id("reason", reason, MAX_NOTES_LEN)?;

        with_deadline(&self.config, async {
            let mut tx = self.db.begin().await?;
            let item = self.authorize_item(&mut tx, scope, &scope.shop_id, item_id).await?;

            let new_quantity = if delta > 0 {
                self.stock
                    .increment(&mut tx, &scope.shop_id, item_id, delta, None)
                    .await?
            } else {
                self.guarded_decrement(&mut tx, &scope.shop_id, &item, -delta).await?
            };

            let movement = self
                .stock
                .record_movement(
                    &mut tx,
                    NewMovement {
                        shop_id: &scope.shop_id,
                        item_id,
                        user_id: &scope.actor_id,
                        movement_type: MovementType::Adjustment,
                        quantity_changed: delta,
                        new_quantity_after: new_quantity,
                        reason: Some(reason),
                        reference_id: None,
                    },
                )
                .await?;

            commit(tx).await?;
            info!(shop_id = %scope.shop_id, item_id = %item_id, delta, new_quantity, "Stock adjusted");
            Ok(change(movement))
        })
        .await
    }

    /// Moves `qty` units between two shops of the same merchant.
    ///
    /// Staff and shop principals may only send from their own shop; the
    /// destination may be any active shop of the merchant.
    pub async fn transfer(
        &self,
        identity: &Identity,
        from_shop: &str,
        to_shop: &str,
        item_id: &str,
        qty: i64,
        reason: Option<&str>,
    ) -> SaleResult<TransferOutcome> {
        validate_id("fromShopId", from_shop, MAX_LOCAL_ID_LEN)?;
        validate_id("toShopId", to_shop, MAX_LOCAL_ID_LEN)?;
        validate_id("itemId", item_id, MAX_LOCAL_ID_LEN)?;
        validate_stock_quantity(qty)?;
        validate_notes(reason)?;
        if from_shop == to_shop {
            return Err(ValidationError::MustDiffer {
                field: "toShopId".to_string(),
                other: "fromShopId".to_string(),
            }
            .into());
        }

        let scope = identity.checkout_scope(Some(from_shop))?;

        with_deadline(&self.config, async {
            let mut tx = self.db.begin().await?;
            let item = self.authorize_item(&mut tx, &scope, from_shop, item_id).await?;
            authorize_shop(&self.catalog, &mut tx, &scope.merchant_id, to_shop).await?;

            let transfer_id = Uuid::new_v4().to_string();

            let source_quantity = self.guarded_decrement(&mut tx, from_shop, &item, qty).await?;
            let source = self
                .stock
                .record_movement(
                    &mut tx,
                    NewMovement {
                        shop_id: from_shop,
                        item_id,
                        user_id: &scope.actor_id,
                        movement_type: MovementType::TransferOut,
                        quantity_changed: -qty,
                        new_quantity_after: source_quantity,
                        reason,
                        reference_id: Some(&transfer_id),
                    },
                )
                .await?;

            let destination_quantity = self.stock.increment(&mut tx, to_shop, item_id, qty, None).await?;
            let destination = self
                .stock
                .record_movement(
                    &mut tx,
                    NewMovement {
                        shop_id: to_shop,
                        item_id,
                        user_id: &scope.actor_id,
                        movement_type: MovementType::TransferIn,
                        quantity_changed: qty,
                        new_quantity_after: destination_quantity,
                        reason,
                        reference_id: Some(&transfer_id),
                    },
                )
                .await?;

            commit(tx).await?;
            info!(
                transfer_id = %transfer_id,
                from_shop = %from_shop,
                to_shop = %to_shop,
                item_id = %item_id,
                qty,
                "Stock transferred"
            );
            Ok(TransferOutcome {
                transfer_id,
                source: change(source),
                destination: change(destination),
            })
        })
        .await
    }

    /// Current stock row, or `None` if the item was never stocked here.
    pub async fn stock_level(
        &self,
        identity: &Identity,
        shop_id: &str,
        item_id: &str,
    ) -> SaleResult<Option<ShopStock>> {
        self.authorize_read(identity, shop_id).await?;
        Ok(self.stock.get(shop_id, item_id).await?)
    }

    /// Ledger for one (shop, item), newest first. `limit` is clamped to
    /// `1..=MAX_MOVEMENT_LIMIT`.
    pub async fn movements(
        &self,
        identity: &Identity,
        shop_id: &str,
        item_id: &str,
        limit: Option<i64>,
    ) -> SaleResult<Vec<StockMovement>> {
        self.authorize_read(identity, shop_id).await?;
        let limit = limit
            .unwrap_or(DEFAULT_MOVEMENT_LIMIT)
            .clamp(1, MAX_MOVEMENT_LIMIT);
        Ok(self.stock.movements(shop_id, item_id, limit).await?)
    }

    async fn authorize_item(
        &self,
        conn: &mut SqliteConnection,
        scope: &CheckoutScope,
        shop_id: &str,
        item_id: &str,
    ) -> SaleResult<stockwise_core::CatalogItem> {
        authorize_shop(&self.catalog, conn, &scope.merchant_id, shop_id).await?;
        let item = self
            .catalog
            .item_for_merchant(conn, &scope.merchant_id, item_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        Ok(item)
    }

    async fn authorize_read(&self, identity: &Identity, shop_id: &str) -> SaleResult<()> {
        let scope = identity.checkout_scope(Some(shop_id))?;
        // Released before the caller reads through the pool.
        let mut conn = self.db.pool().acquire().await.map_err(DbError::from)?;
        authorize_shop(&self.catalog, &mut conn, &scope.merchant_id, shop_id).await?;
        Ok(())
    }

    async fn guarded_decrement(
        &self,
        conn: &mut SqliteConnection,
        shop_id: &str,
        item: &stockwise_core::CatalogItem,
        qty: i64,
    ) -> SaleResult<i64> {
        match self.stock.decrement(conn, shop_id, &item.id, qty).await? {
            Decrement::Applied { new_quantity } => Ok(new_quantity),
            Decrement::Insufficient { available } => Err(CoreError::InsufficientStock {
                item_id: item.id.clone(),
                sku: item.sku.clone(),
                available,
                requested: qty,
            }
            .into()),
        }
    }
}

async fn commit(tx: sqlx::Transaction<'static, sqlx::Sqlite>) -> Result<(), DbError> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

fn change(movement: StockMovement) -> StockChange {
    StockChange {
        shop_id: movement.shop_id.clone(),
        item_id: movement.item_id.clone(),
        new_quantity: movement.new_quantity_after,
        movement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SaleError;
    use stockwise_db::DbConfig;

    struct Fixture {
        db: Database,
        inventory: InventoryService,
        merchant: String,
        shop_a: String,
        shop_b: String,
        item: String,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let merchant = db.catalog().insert_merchant("M").await.unwrap();
        let shop_a = db.catalog().insert_shop(&merchant, "A").await.unwrap().id;
        let shop_b = db.catalog().insert_shop(&merchant, "B").await.unwrap().id;
        let item = db
            .catalog()
            .insert_item(&merchant, "SKU", "Thing", 100, None)
            .await
            .unwrap()
            .id;
        let inventory = InventoryService::new(db.clone(), Arc::new(EngineConfig::default()));
        Fixture {
            db,
            inventory,
            merchant,
            shop_a,
            shop_b,
            item,
        }
    }

    fn scope(f: &Fixture, shop: &str) -> CheckoutScope {
        Identity::merchant(&f.merchant).checkout_scope(Some(shop)).unwrap()
    }

    #[tokio::test]
    async fn test_stock_in_creates_row_and_movement() {
        let f = fixture().await;

        let change = f
            .inventory
            .stock_in(&scope(&f, &f.shop_a), &f.item, 12, Some("delivery"))
            .await
            .unwrap();

        assert_eq!(change.new_quantity, 12);
        assert_eq!(change.movement.movement_type, MovementType::StockIn);
        let row = f.db.stock().get(&f.shop_a, &f.item).await.unwrap().unwrap();
        assert_eq!(row.quantity, 12);
        assert!(row.last_stocked_in_at.is_some());
    }

    #[tokio::test]
    async fn test_negative_adjustment_cannot_go_below_zero() {
        let f = fixture().await;
        let s = scope(&f, &f.shop_a);
        f.inventory.stock_in(&s, &f.item, 3, None).await.unwrap();

        let err = f.inventory.adjust(&s, &f.item, -4, "breakage").await.unwrap_err();
        assert!(matches!(
            err,
            SaleError::Domain(CoreError::InsufficientStock { available: 3, requested: 4, .. })
        ));

        let change = f.inventory.adjust(&s, &f.item, -3, "breakage").await.unwrap();
        assert_eq!(change.new_quantity, 0);
        assert_eq!(change.movement.quantity_changed, -3);
        assert_eq!(f.db.stock().count_movements().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_adjustment_requires_reason() {
        let f = fixture().await;
        let err = f
            .inventory
            .adjust(&scope(&f, &f.shop_a), &f.item, 2, "  ")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_transfer_moves_stock_with_paired_movements() {
        let f = fixture().await;
        f.inventory
            .stock_in(&scope(&f, &f.shop_a), &f.item, 10, None)
            .await
            .unwrap();

        let outcome = f
            .inventory
            .transfer(&Identity::merchant(&f.merchant), &f.shop_a, &f.shop_b, &f.item, 4, None)
            .await
            .unwrap();

        assert_eq!(outcome.source.new_quantity, 6);
        assert_eq!(outcome.destination.new_quantity, 4);

        let legs = f.db.stock().movements_for_reference(&outcome.transfer_id).await.unwrap();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].movement_type, MovementType::TransferOut);
        assert_eq!(legs[1].movement_type, MovementType::TransferIn);
    }

    #[tokio::test]
    async fn test_failed_transfer_leaves_both_shops_untouched() {
        let f = fixture().await;
        f.inventory
            .stock_in(&scope(&f, &f.shop_a), &f.item, 2, None)
            .await
            .unwrap();

        let err = f
            .inventory
            .transfer(&Identity::merchant(&f.merchant), &f.shop_a, &f.shop_b, &f.item, 3, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_STOCK");
        assert_eq!(f.db.stock().get(&f.shop_a, &f.item).await.unwrap().unwrap().quantity, 2);
        assert!(f.db.stock().get(&f.shop_b, &f.item).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transfer_to_same_shop_rejected() {
        let f = fixture().await;
        let err = f
            .inventory
            .transfer(&Identity::merchant(&f.merchant), &f.shop_a, &f.shop_a, &f.item, 1, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_staff_cannot_read_other_shop() {
        let f = fixture().await;
        let staff = Identity::staff(&f.merchant, "staff-1", &f.shop_a);

        assert!(f.inventory.stock_level(&staff, &f.shop_a, &f.item).await.unwrap().is_none());
        let err = f
            .inventory
            .movements(&staff, &f.shop_b, &f.item, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "SHOP_ACCESS_DENIED");
    }
}
