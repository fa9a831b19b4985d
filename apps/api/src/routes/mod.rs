//! HTTP routes.
//!
//! ```text
//! POST /v1/merchant/shops/{shop_id}/checkout   merchant, shop from path
//! POST /v1/staff/checkout                      staff, own shop
//! POST /v1/shop/checkout                       shop terminal, own shop
//! POST /v1/sales                               any role, shop from body
//! GET  /v1/sales/{sale_id}
//!
//! POST /v1/sync/sales                          offline batch
//!
//! POST /v1/shops/{shop_id}/stock-in
//! POST /v1/shops/{shop_id}/adjustments
//! POST /v1/transfers
//! GET  /v1/shops/{shop_id}/stock/{item_id}
//! GET  /v1/shops/{shop_id}/stock/{item_id}/movements?limit=
//!
//! GET  /health
//! ```

mod checkout;
mod health;
mod stock;
mod sync;

use axum::{
    routing::{get, post},
    Router,
};

use stockwise_core::{Identity, Role};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/merchant/shops/{shop_id}/checkout", post(checkout::merchant_checkout))
        .route("/v1/staff/checkout", post(checkout::staff_checkout))
        .route("/v1/shop/checkout", post(checkout::shop_checkout))
        .route("/v1/sales", post(checkout::sale))
        .route("/v1/sales/{sale_id}", get(checkout::get_sale))
        .route("/v1/sync/sales", post(sync::sync_batch))
        .route("/v1/shops/{shop_id}/stock-in", post(stock::stock_in))
        .route("/v1/shops/{shop_id}/adjustments", post(stock::adjust))
        .route("/v1/transfers", post(stock::transfer))
        .route("/v1/shops/{shop_id}/stock/{item_id}", get(stock::stock_level))
        .route("/v1/shops/{shop_id}/stock/{item_id}/movements", get(stock::movements))
        .route("/health", get(health::health))
        .with_state(state)
}

fn require_role(identity: &Identity, role: Role) -> Result<(), ApiError> {
    if identity.role != role {
        return Err(ApiError::Forbidden(format!(
            "This endpoint is for {:?} callers",
            role
        )));
    }
    Ok(())
}
