//! Error types for the HTTP layer.
//!
//! Every error leaves as `{"code", "message", "retryable"}` with a status
//! derived from the engine error it wraps.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use stockwise_core::CoreError;
use stockwise_engine::SaleError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Sale(#[from] SaleError),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Authorization failed: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Sale(SaleError::Domain(e)) => match e {
                CoreError::InsufficientStock { .. } => StatusCode::CONFLICT,
                CoreError::ItemNotFound(_)
                | CoreError::ShopNotFound(_)
                | CoreError::SaleNotFound(_) => StatusCode::NOT_FOUND,
                CoreError::ShopAccessDenied { .. } => StatusCode::FORBIDDEN,
                CoreError::InvalidPromotion { .. } | CoreError::Validation(_) => {
                    StatusCode::BAD_REQUEST
                }
                CoreError::InvoiceNumberUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Sale(SaleError::Database(e)) if e.is_transient() => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Sale(SaleError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Sale(SaleError::TimedOut(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::AuthFailed(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Sale(e) => e.code(),
            ApiError::AuthFailed(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            ApiError::Sale(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed");
        }

        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
            retryable: self.retryable(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Sale(SaleError::Domain(err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
