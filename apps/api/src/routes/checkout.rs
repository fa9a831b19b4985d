//! Checkout entry points.
//!
//! Each one only resolves the scope differently; all of them end in the
//! same `SaleTransactionProcessor::checkout`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use stockwise_core::{CheckoutRequest, CheckoutScope, CompletedSale, Role};

use super::require_role;
use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::state::AppState;

type Created = (StatusCode, Json<CompletedSale>);

pub async fn merchant_checkout(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Path(shop_id): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Created> {
    require_role(&identity, Role::Merchant)?;
    let scope = identity.checkout_scope(Some(shop_id.as_str()))?;
    run(&state, scope, request).await
}

pub async fn staff_checkout(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Created> {
    require_role(&identity, Role::Staff)?;
    let scope = identity.checkout_scope(request.shop_id.as_deref())?;
    run(&state, scope, request).await
}

pub async fn shop_checkout(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Created> {
    require_role(&identity, Role::Shop)?;
    let scope = identity.checkout_scope(request.shop_id.as_deref())?;
    run(&state, scope, request).await
}

/// Generic sale endpoint for any role. Merchants name the shop in the body.
pub async fn sale(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Created> {
    let scope = identity.checkout_scope(request.shop_id.as_deref())?;
    run(&state, scope, request).await
}

pub async fn get_sale(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Path(sale_id): Path<String>,
) -> ApiResult<Json<CompletedSale>> {
    let completed = state.engine.processor().get_sale(&identity, &sale_id).await?;
    Ok(Json(completed))
}

async fn run(state: &AppState, scope: CheckoutScope, request: CheckoutRequest) -> ApiResult<Created> {
    let completed = state.engine.processor().checkout(&scope, request).await?;
    Ok((StatusCode::CREATED, Json(completed)))
}
