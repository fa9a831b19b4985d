//! JWT authentication.
//!
//! Bearer tokens are decoded straight into a typed [`Identity`]; handlers
//! never look at raw claims.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockwise_core::{Identity, Role};

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (acting user, or the shop for shop logins)
    pub sub: String,

    pub merchant_id: String,

    pub role: Role,

    /// Required for staff and shop tokens
    #[serde(default)]
    pub shop_id: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID
    pub jti: String,
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        JwtManager {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Signs a token for `identity`. Used by tests and local tooling.
    pub fn issue(&self, identity: &Identity) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: identity.actor_id.clone(),
            merchant_id: identity.merchant_id.clone(),
            role: identity.role,
            shop_id: identity.shop_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validates a token and resolves the caller.
    pub fn validate(&self, token: &str) -> Result<Identity, ApiError> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ApiError::AuthFailed(format!("Invalid token: {}", e)))?;

        let claims = token_data.claims;
        if claims.role != Role::Merchant && claims.shop_id.is_none() {
            return Err(ApiError::AuthFailed(
                "Staff and shop tokens must carry a shop".to_string(),
            ));
        }

        Ok(Identity {
            merchant_id: claims.merchant_id,
            actor_id: claims.sub,
            role: claims.role,
            shop_id: claims.shop_id,
        })
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::AuthFailed("Missing authorization header".to_string()))?;

        let token = extract_bearer_token(value)
            .ok_or_else(|| ApiError::AuthFailed("Expected a bearer token".to_string()))?;

        state.jwt.validate(token).map(Authenticated)
    }
}
