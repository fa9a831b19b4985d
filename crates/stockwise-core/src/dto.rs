//! # Wire Types
//!
//! Request and response shapes shared by the engine and the HTTP layer.
//! Everything here is camelCase on the wire and exported to TypeScript.
//!
//! ```text
//! CheckoutRequest ──► SaleTransactionProcessor ──► CompletedSale
//!
//! SyncBatchRequest ──► OfflineSyncReconciler ──► SyncBatchResponse
//!   └─ OfflineSaleRecord × N                      └─ SyncResult × N
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{PaymentType, StockMovement};

// =============================================================================
// Checkout
// =============================================================================

/// One cart line.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub item_id: String,
    pub quantity: i64,
    /// Price charged per unit. Falls back to the catalog price when absent.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
}

/// A checkout as submitted by a POS client.
///
/// `shop_id` is only read by the generic sale endpoint; the other entry
/// points take the shop from the path or from the caller's identity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub shop_id: Option<String>,
    pub items: Vec<CheckoutLine>,
    pub payment_type: PaymentType,
    #[serde(default)]
    pub promotion_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Offline Sync
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OfflineSaleLine {
    pub item_id: String,
    pub quantity: i64,
}

/// A sale recorded on a device while offline. `local_id` is the
/// idempotency key.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OfflineSaleRecord {
    pub local_id: String,
    pub shop_id: String,
    pub items: Vec<OfflineSaleLine>,
    /// Total the device computed. Informational; the server reprices.
    pub total_amount_cents: i64,
    pub payment_type: PaymentType,
    /// When the sale happened on the device.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SyncBatchRequest {
    pub batch_id: String,
    pub device_id: String,
    pub sales: Vec<OfflineSaleRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Synced,
    Failed,
}

/// Outcome for one offline record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub local_id: String,
    /// Server sale id. Identical on every replay of the same local id.
    pub server_id: Option<String>,
    pub status: SyncStatus,
    pub error: Option<String>,
    pub error_code: Option<String>,
    /// True when resending the record may succeed unchanged.
    pub retryable: bool,
    #[ts(as = "Option<String>")]
    pub server_timestamp: Option<DateTime<Utc>>,
}

impl SyncResult {
    pub fn synced(local_id: impl Into<String>, server_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            local_id: local_id.into(),
            server_id: Some(server_id.into()),
            status: SyncStatus::Synced,
            error: None,
            error_code: None,
            retryable: false,
            server_timestamp: Some(at),
        }
    }

    pub fn failed(
        local_id: impl Into<String>,
        code: &str,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            local_id: local_id.into(),
            server_id: None,
            status: SyncStatus::Failed,
            error: Some(message.into()),
            error_code: Some(code.to_string()),
            retryable,
            server_timestamp: None,
        }
    }

    pub fn is_synced(&self) -> bool {
        self.status == SyncStatus::Synced
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    Partial,
    Failed,
}

impl BatchStatus {
    /// `success` when nothing failed (including an empty batch), `failed`
    /// when nothing synced, `partial` otherwise.
    pub fn from_counts(synced: usize, failed: usize) -> Self {
        match (synced, failed) {
            (_, 0) => BatchStatus::Success,
            (0, _) => BatchStatus::Failed,
            _ => BatchStatus::Partial,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SyncBatchResponse {
    pub batch_id: String,
    pub status: BatchStatus,
    pub synced_count: usize,
    pub failed_count: usize,
    pub results: Vec<SyncResult>,
}

impl SyncBatchResponse {
    pub fn from_results(batch_id: impl Into<String>, results: Vec<SyncResult>) -> Self {
        let synced_count = results.iter().filter(|r| r.is_synced()).count();
        let failed_count = results.len() - synced_count;
        Self {
            batch_id: batch_id.into(),
            status: BatchStatus::from_counts(synced_count, failed_count),
            synced_count,
            failed_count,
            results,
        }
    }
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockInRequest {
    pub item_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Signed correction: positive adds, negative removes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequest {
    pub item_id: String,
    pub delta: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_shop_id: String,
    pub to_shop_id: String,
    pub item_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A committed stock change and the ledger row written with it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub shop_id: String,
    pub item_id: String,
    pub new_quantity: i64,
    pub movement: StockMovement,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub transfer_id: String,
    pub source: StockChange,
    pub destination: StockChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_status_from_counts() {
        assert_eq!(BatchStatus::from_counts(0, 0), BatchStatus::Success);
        assert_eq!(BatchStatus::from_counts(3, 0), BatchStatus::Success);
        assert_eq!(BatchStatus::from_counts(0, 2), BatchStatus::Failed);
        assert_eq!(BatchStatus::from_counts(1, 1), BatchStatus::Partial);
    }

    #[test]
    fn test_response_counts() {
        let now = Utc::now();
        let response = SyncBatchResponse::from_results(
            "batch-1",
            vec![
                SyncResult::synced("l1", "s1", now),
                SyncResult::failed("l2", "ITEM_NOT_FOUND", "Item not found: x", false),
            ],
        );
        assert_eq!(response.synced_count, 1);
        assert_eq!(response.failed_count, 1);
        assert_eq!(response.status, BatchStatus::Partial);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["syncedCount"], 1);
        assert_eq!(json["results"][1]["errorCode"], "ITEM_NOT_FOUND");
        assert_eq!(json["results"][0]["status"], "synced");
    }

    #[test]
    fn test_checkout_request_from_camel_case() {
        let req: CheckoutRequest = serde_json::from_str(
            r#"{
                "items": [{"itemId": "a", "quantity": 2, "unitPriceCents": 500}],
                "paymentType": "cash",
                "promotionId": "promo"
            }"#,
        )
        .unwrap();
        assert!(req.shop_id.is_none());
        assert_eq!(req.items[0].unit_price_cents, Some(500));
        assert_eq!(req.promotion_id.as_deref(), Some("promo"));
    }
}
