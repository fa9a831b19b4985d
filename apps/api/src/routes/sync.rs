use axum::{extract::State, Json};

use stockwise_core::{SyncBatchRequest, SyncBatchResponse};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::state::AppState;

/// Reconciles an offline batch. A `partial` batch is still a 200: callers
/// read the per-record results.
pub async fn sync_batch(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Json(request): Json<SyncBatchRequest>,
) -> ApiResult<Json<SyncBatchResponse>> {
    let response = state.engine.reconciler().sync_batch(&identity, request).await?;
    Ok(Json(response))
}
