//! # Offline Sync Reconciler
//!
//! Replays sales recorded by POS terminals while offline.
//!
//! ## Batch Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN (batch)                                                          │
//! │   record 1 ── localId seen? ──yes──► synced (existing serverId)         │
//! │                  │ no                                                   │
//! │                  ▼                                                      │
//! │              SAVEPOINT ── apply ──ok──► RELEASE ──► synced              │
//! │                              └──err──► ROLLBACK TO ──► failed           │
//! │   record 2 ── ...                                                       │
//! │  COMMIT (batch)                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failing record only rolls back its own savepoint. Siblings that
//! synced are committed with the batch.
//!
//! The `localId → serverId` marker is the `local_id` column on the sale
//! itself, so the marker and the sale commit or vanish together.

use std::sync::Arc;

use chrono::Utc;
use sqlx::{Acquire, SqliteConnection};
use tracing::{debug, info, warn};

use stockwise_core::validation::{validate_batch_size, validate_id, validate_offline_record};
use stockwise_core::{
    CheckoutLine, Identity, OfflineSaleRecord, SyncBatchRequest, SyncBatchResponse, SyncResult,
    MAX_LOCAL_ID_LEN,
};
use stockwise_db::{Database, DbError, SaleRepository};

use crate::checkout::{with_deadline, SaleInput, SaleTransactionProcessor};
use crate::config::EngineConfig;
use crate::error::{SaleError, SaleResult};

#[derive(Debug, Clone)]
pub struct OfflineSyncReconciler {
    db: Database,
    sales: SaleRepository,
    processor: SaleTransactionProcessor,
    config: Arc<EngineConfig>,
}

impl OfflineSyncReconciler {
    pub fn new(db: Database, processor: SaleTransactionProcessor, config: Arc<EngineConfig>) -> Self {
        OfflineSyncReconciler {
            sales: db.sales(),
            db,
            processor,
            config,
        }
    }

    /// Reconciles one batch.
    ///
    /// Returns `Err` only when the batch as a whole could not run (oversized
    /// batch, deadline, outer commit). Record-level failures are reported
    /// in `results`.
    pub async fn sync_batch(
        &self,
        identity: &Identity,
        request: SyncBatchRequest,
    ) -> SaleResult<SyncBatchResponse> {
        validate_batch_size(request.sales.len(), self.config.max_sync_batch_size)?;
        validate_id("deviceId", &request.device_id, MAX_LOCAL_ID_LEN)?;

        with_deadline(&self.config, async {
            let mut tx = self.db.begin().await?;

            let mut results = Vec::with_capacity(request.sales.len());
            for record in &request.sales {
                results.push(self.reconcile(&mut tx, identity, &request.device_id, record).await?);
            }

            tx.commit()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

            let response = SyncBatchResponse::from_results(&request.batch_id, results);
            info!(
                batch_id = %response.batch_id,
                device_id = %request.device_id,
                merchant_id = %identity.merchant_id,
                synced = response.synced_count,
                failed = response.failed_count,
                "Sync batch reconciled"
            );
            Ok(response)
        })
        .await
    }

    /// Reconciles a single record inside the batch transaction.
    ///
    /// Returns `Err` only for faults on the batch connection itself.
    async fn reconcile(
        &self,
        conn: &mut SqliteConnection,
        identity: &Identity,
        device_id: &str,
        record: &OfflineSaleRecord,
    ) -> SaleResult<SyncResult> {
        if let Err(e) = validate_offline_record(record) {
            let err = SaleError::from(e);
            warn!(local_id = %record.local_id, error = %err, "Offline sale rejected");
            return Ok(SyncResult::failed(&record.local_id, err.code(), err.to_string(), false));
        }

        if let Some(existing) = self
            .sales
            .find_by_local_id(conn, &identity.merchant_id, &record.local_id)
            .await?
        {
            debug!(local_id = %record.local_id, sale_id = %existing.id, "Offline sale already synced");
            return Ok(SyncResult::synced(&record.local_id, existing.id, existing.created_at));
        }

        let outcome = {
            let mut savepoint = (&mut *conn).begin().await.map_err(DbError::from)?;
            match self.apply_record(&mut savepoint, identity, device_id, record).await {
                Ok(completed) => savepoint.commit().await.map(|_| Ok(completed)),
                Err(e) => savepoint.rollback().await.map(|_| Err(e)),
            }
        }
        .map_err(DbError::from)?;

        match outcome {
            Ok(completed) => {
                if completed.sale.total_cents != record.total_amount_cents {
                    warn!(
                        local_id = %record.local_id,
                        client_total_cents = record.total_amount_cents,
                        server_total_cents = completed.sale.total_cents,
                        "Offline sale total differs from catalog pricing"
                    );
                }
                Ok(SyncResult::synced(
                    &record.local_id,
                    completed.sale.id,
                    completed.sale.created_at,
                ))
            }
            Err(SaleError::Database(e)) if e.is_unique_violation_on("local_id") => {
                // Lost a race with a concurrent batch carrying the same record.
                match self
                    .sales
                    .find_by_local_id(conn, &identity.merchant_id, &record.local_id)
                    .await?
                {
                    Some(existing) => {
                        Ok(SyncResult::synced(&record.local_id, existing.id, existing.created_at))
                    }
                    None => {
                        let err = SaleError::Database(e);
                        Ok(SyncResult::failed(&record.local_id, err.code(), err.to_string(), true))
                    }
                }
            }
            Err(err) => {
                warn!(
                    local_id = %record.local_id,
                    shop_id = %record.shop_id,
                    code = err.code(),
                    error = %err,
                    "Offline sale failed"
                );
                Ok(SyncResult::failed(
                    &record.local_id,
                    err.code(),
                    err.to_string(),
                    err.is_retryable(),
                ))
            }
        }
    }

    async fn apply_record(
        &self,
        conn: &mut SqliteConnection,
        identity: &Identity,
        device_id: &str,
        record: &OfflineSaleRecord,
    ) -> SaleResult<stockwise_core::CompletedSale> {
        let scope = identity.checkout_scope(Some(record.shop_id.as_str()))?;

        // Offline lines always sell at the catalog price.
        let input = SaleInput {
            lines: record
                .items
                .iter()
                .map(|line| CheckoutLine {
                    item_id: line.item_id.clone(),
                    quantity: line.quantity,
                    unit_price_cents: None,
                })
                .collect(),
            payment_type: record.payment_type,
            promotion_id: None,
            customer_id: record.customer_id.clone(),
            notes: record.notes.clone(),
            sale_date: record.timestamp,
            local_id: Some(record.local_id.clone()),
            device_id: Some(device_id.to_string()),
        };

        self.processor.apply(conn, &scope, &input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockwise_core::{BatchStatus, OfflineSaleLine, PaymentType};
    use stockwise_db::DbConfig;

    async fn setup() -> (Database, OfflineSyncReconciler, String, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let merchant = db.catalog().insert_merchant("M").await.unwrap();
        let shop = db.catalog().insert_shop(&merchant, "S").await.unwrap();
        let item = db
            .catalog()
            .insert_item(&merchant, "A", "Item A", 250, None)
            .await
            .unwrap();

        let mut tx = db.begin().await.unwrap();
        db.stock().increment(&mut tx, &shop.id, &item.id, 5, None).await.unwrap();
        tx.commit().await.unwrap();

        let config = Arc::new(EngineConfig::default().max_sync_batch_size(3));
        let processor = SaleTransactionProcessor::new(db.clone(), config.clone());
        let reconciler = OfflineSyncReconciler::new(db.clone(), processor, config);
        (db, reconciler, merchant, shop.id, item.id)
    }

    fn record(local_id: &str, shop: &str, item: &str, qty: i64) -> OfflineSaleRecord {
        OfflineSaleRecord {
            local_id: local_id.to_string(),
            shop_id: shop.to_string(),
            items: vec![OfflineSaleLine {
                item_id: item.to_string(),
                quantity: qty,
            }],
            total_amount_cents: 250 * qty,
            payment_type: PaymentType::Cash,
            timestamp: Utc::now(),
            customer_id: None,
            notes: None,
        }
    }

    fn batch(sales: Vec<OfflineSaleRecord>) -> SyncBatchRequest {
        SyncBatchRequest {
            batch_id: "b-1".to_string(),
            device_id: "till-1".to_string(),
            sales,
        }
    }

    #[tokio::test]
    async fn test_same_local_id_twice_in_one_batch() {
        let (db, reconciler, merchant, shop, item) = setup().await;
        let identity = Identity::merchant(&merchant);

        let response = reconciler
            .sync_batch(
                &identity,
                batch(vec![record("L1", &shop, &item, 1), record("L1", &shop, &item, 1)]),
            )
            .await
            .unwrap();

        assert_eq!(response.status, BatchStatus::Success);
        assert_eq!(response.results[0].server_id, response.results[1].server_id);
        assert_eq!(db.sales().count_sales().await.unwrap(), 1);
        assert_eq!(db.stock().get(&shop, &item).await.unwrap().unwrap().quantity, 4);
    }

    #[tokio::test]
    async fn test_invalid_record_fails_locally() {
        let (_db, reconciler, merchant, shop, item) = setup().await;
        let identity = Identity::merchant(&merchant);

        let response = reconciler
            .sync_batch(
                &identity,
                batch(vec![record("L1", &shop, &item, 0), record("L2", &shop, &item, 1)]),
            )
            .await
            .unwrap();

        assert_eq!(response.status, BatchStatus::Partial);
        assert_eq!(response.results[0].error_code.as_deref(), Some("VALIDATION_ERROR"));
        assert!(!response.results[0].retryable);
        assert!(response.results[1].is_synced());
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected_before_work() {
        let (db, reconciler, merchant, shop, item) = setup().await;
        let identity = Identity::merchant(&merchant);
        let sales = (0..4).map(|i| record(&format!("L{i}"), &shop, &item, 1)).collect();

        let err = reconciler.sync_batch(&identity, batch(sales)).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(db.sales().count_sales().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_records_device_and_local_id() {
        let (db, reconciler, merchant, shop, item) = setup().await;
        let identity = Identity::merchant(&merchant);
        let rec = record("L9", &shop, &item, 2);
        let sold_at = rec.timestamp;

        let response = reconciler.sync_batch(&identity, batch(vec![rec])).await.unwrap();
        let sale_id = response.results[0].server_id.clone().unwrap();

        let completed = db.sales().get_completed(&merchant, &sale_id).await.unwrap().unwrap();
        assert_eq!(completed.sale.local_id.as_deref(), Some("L9"));
        assert_eq!(completed.sale.device_id.as_deref(), Some("till-1"));
        assert_eq!(completed.sale.sale_date.timestamp(), sold_at.timestamp());
        assert_eq!(completed.sale.total_cents, 500);
    }
}
