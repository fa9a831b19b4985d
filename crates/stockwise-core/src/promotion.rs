//! # Promotion Validator
//!
//! Stateless check of a single promotion against a checkout, plus the
//! discount it grants. The caller loads the promotion; nothing here reads
//! the database or the clock.
//!
//! ## Check Order
//! ```text
//! exists ─► merchant ─► active ─► started ─► not expired ─► shop ─► min spend
//!   │          │           │          │            │           │         │
//!   ▼          ▼           ▼          ▼            ▼           ▼         ▼
//! NotFound  WrongMerchant Inactive NotStarted   Expired     WrongShop BelowMinimumSpend
//! ```
//!
//! The first failing check wins. A missing start or end date leaves that
//! side of the window unbounded.
//!
//! ## Discount
//! - `percentage`: `value` basis points of the subtotal, rounded half-up
//! - `fixed_amount`: `value` cents, capped at the subtotal
//!
//! The discount never exceeds the subtotal, so a sale total is never negative.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, PromotionRejection};
use crate::money::{Money, BPS_SCALE};
use crate::types::{Promotion, PromotionType};

/// Where and when a promotion is being redeemed.
#[derive(Debug, Clone, Copy)]
pub struct PromotionContext<'a> {
    pub merchant_id: &'a str,
    pub shop_id: &'a str,
    pub subtotal: Money,
    pub now: DateTime<Utc>,
}

pub struct PromotionValidator;

impl PromotionValidator {
    /// Validates `promotion` (as loaded for `promotion_id`) and returns the
    /// discount.
    ///
    /// ```rust
    /// use chrono::Utc;
    /// use stockwise_core::money::Money;
    /// use stockwise_core::promotion::{PromotionContext, PromotionValidator};
    ///
    /// // No promotion requested: no discount, nothing validated.
    /// let ctx = PromotionContext {
    ///     merchant_id: "m1",
    ///     shop_id: "s1",
    ///     subtotal: Money::from_cents(2000),
    ///     now: Utc::now(),
    /// };
    /// assert!(PromotionValidator::validate(None, None, &ctx).unwrap().is_zero());
    /// ```
    pub fn validate(
        promotion_id: Option<&str>,
        promotion: Option<&Promotion>,
        ctx: &PromotionContext<'_>,
    ) -> Result<Money, CoreError> {
        let Some(promotion_id) = promotion_id else {
            return Ok(Money::zero());
        };

        let reject = |reason: PromotionRejection| CoreError::InvalidPromotion {
            promotion_id: promotion_id.to_string(),
            reason,
        };

        let promotion = promotion.ok_or_else(|| reject(PromotionRejection::NotFound))?;
        Self::check(promotion, ctx).map_err(reject)?;
        discount(promotion, ctx.subtotal).map_err(reject)
    }

    /// Runs the eligibility checks in order.
    pub fn check(promotion: &Promotion, ctx: &PromotionContext<'_>) -> Result<(), PromotionRejection> {
        if promotion.merchant_id != ctx.merchant_id {
            return Err(PromotionRejection::WrongMerchant);
        }
        if !promotion.is_active {
            return Err(PromotionRejection::Inactive);
        }
        if let Some(start) = promotion.start_date {
            if ctx.now < start {
                return Err(PromotionRejection::NotStarted);
            }
        }
        if let Some(end) = promotion.end_date {
            if ctx.now > end {
                return Err(PromotionRejection::Expired);
            }
        }
        if let Some(shop_id) = promotion.shop_id.as_deref() {
            if shop_id != ctx.shop_id {
                return Err(PromotionRejection::WrongShop);
            }
        }

        let min_spend = Money::from_cents(promotion.min_spend_cents);
        if ctx.subtotal < min_spend {
            return Err(PromotionRejection::BelowMinimumSpend {
                min_spend,
                subtotal: ctx.subtotal,
            });
        }

        Ok(())
    }
}

/// Discount granted by an eligible promotion on `subtotal`.
pub fn discount(promotion: &Promotion, subtotal: Money) -> Result<Money, PromotionRejection> {
    if promotion.value < 0 {
        return Err(PromotionRejection::InvalidValue);
    }

    let amount = match promotion.promotion_type {
        PromotionType::Percentage => {
            if promotion.value > BPS_SCALE {
                return Err(PromotionRejection::InvalidValue);
            }
            subtotal.percentage_of(promotion.value as u32)
        }
        PromotionType::FixedAmount => Money::from_cents(promotion.value),
    };

    Ok(amount.min(subtotal))
}

// =============================================================================
// Unit Tests
// =============================================================================
