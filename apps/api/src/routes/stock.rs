use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwise_core::{
    AdjustmentRequest, StockChange, StockInRequest, StockMovement, TransferOutcome, TransferRequest,
};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub shop_id: String,
    pub item_id: String,
    /// Zero when the item was never stocked at this shop.
    pub quantity: i64,
    pub last_stocked_in_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub limit: Option<i64>,
}

pub async fn stock_in(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Path(shop_id): Path<String>,
    Json(request): Json<StockInRequest>,
) -> ApiResult<Json<StockChange>> {
    let scope = identity.checkout_scope(Some(shop_id.as_str()))?;
    let change = state
        .engine
        .inventory()
        .stock_in(&scope, &request.item_id, request.quantity, request.reason.as_deref())
        .await?;
    Ok(Json(change))
}

pub async fn adjust(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Path(shop_id): Path<String>,
    Json(request): Json<AdjustmentRequest>,
) -> ApiResult<Json<StockChange>> {
    let scope = identity.checkout_scope(Some(shop_id.as_str()))?;
    let change = state
        .engine
        .inventory()
        .adjust(&scope, &request.item_id, request.delta, &request.reason)
        .await?;
    Ok(Json(change))
}

pub async fn transfer(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Json(request): Json<TransferRequest>,
) -> ApiResult<Json<TransferOutcome>> {
    let outcome = state
        .engine
        .inventory()
        .transfer(
            &identity,
            &request.from_shop_id,
            &request.to_shop_id,
            &request.item_id,
            request.quantity,
            request.reason.as_deref(),
        )
        .await?;
    Ok(Json(outcome))
}

pub async fn stock_level(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Path((shop_id, item_id)): Path<(String, String)>,
) -> ApiResult<Json<StockLevel>> {
    let row = state
        .engine
        .inventory()
        .stock_level(&identity, &shop_id, &item_id)
        .await?;

    Ok(Json(StockLevel {
        quantity: row.as_ref().map_or(0, |r| r.quantity),
        last_stocked_in_at: row.and_then(|r| r.last_stocked_in_at),
        shop_id,
        item_id,
    }))
}

pub async fn movements(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Path((shop_id, item_id)): Path<(String, String)>,
    Query(query): Query<MovementQuery>,
) -> ApiResult<Json<Vec<StockMovement>>> {
    let rows = state
        .engine
        .inventory()
        .movements(&identity, &shop_id, &item_id, query.limit)
        .await?;
    Ok(Json(rows))
}
