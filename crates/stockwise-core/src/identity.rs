//! # Identity
//!
//! The calling principal, already authenticated upstream, and the rules
//! that turn it into the `{merchant, shop, actor}` a sale is recorded under.
//!
//! ```text
//! ┌──────────┬──────────────────────────┬──────────────────────────────┐
//! │ Role     │ Shop comes from          │ Other shop requested         │
//! ├──────────┼──────────────────────────┼──────────────────────────────┤
//! │ merchant │ the request (required)   │ allowed (ownership checked   │
//! │          │                          │ against the shop row later)  │
//! │ staff    │ the identity             │ ShopAccessDenied             │
//! │ shop     │ the identity             │ ShopAccessDenied             │
//! └──────────┴──────────────────────────┴──────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Merchant,
    Staff,
    /// A shop's own POS terminal login.
    Shop,
}

/// A resolved principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub merchant_id: String,
    pub actor_id: String,
    pub role: Role,
    /// Set for staff and shop principals.
    pub shop_id: Option<String>,
}

/// Who is selling, where, for which merchant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutScope {
    pub merchant_id: String,
    pub shop_id: String,
    pub actor_id: String,
    /// Recorded on the Sale when the actor is a staff member.
    pub staff_id: Option<String>,
}

impl Identity {
    pub fn merchant(merchant_id: impl Into<String>) -> Self {
        let merchant_id = merchant_id.into();
        Self {
            actor_id: merchant_id.clone(),
            merchant_id,
            role: Role::Merchant,
            shop_id: None,
        }
    }

    pub fn staff(
        merchant_id: impl Into<String>,
        staff_id: impl Into<String>,
        shop_id: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            actor_id: staff_id.into(),
            role: Role::Staff,
            shop_id: Some(shop_id.into()),
        }
    }

    pub fn shop(merchant_id: impl Into<String>, shop_id: impl Into<String>) -> Self {
        let shop_id = shop_id.into();
        Self {
            merchant_id: merchant_id.into(),
            actor_id: shop_id.clone(),
            role: Role::Shop,
            shop_id: Some(shop_id),
        }
    }

    /// Resolves the shop this principal is acting on.
    ///
    /// Shop ownership by the merchant is not checked here; that needs the
    /// shop row and happens inside the transaction.
    pub fn checkout_scope(&self, requested_shop: Option<&str>) -> CoreResult<CheckoutScope> {
        let shop_id = match self.role {
            Role::Merchant => requested_shop
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| ValidationError::Required {
                    field: "shopId".to_string(),
                })?
                .to_string(),
            Role::Staff | Role::Shop => {
                let own = self.shop_id.as_deref().ok_or_else(|| CoreError::ShopAccessDenied {
                    shop_id: requested_shop.unwrap_or_default().to_string(),
                })?;
                match requested_shop {
                    Some(requested) if requested != own => {
                        return Err(CoreError::ShopAccessDenied {
                            shop_id: requested.to_string(),
                        })
                    }
                    _ => own.to_string(),
                }
            }
        };

        Ok(CheckoutScope {
            merchant_id: self.merchant_id.clone(),
            shop_id,
            actor_id: self.actor_id.clone(),
            staff_id: (self.role == Role::Staff).then(|| self.actor_id.clone()),
        })
    }
}
