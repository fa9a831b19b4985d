//! # Promotion Repository
//!
//! Read-only lookup during checkout. Promotion management lives elsewhere;
//! `insert` is for the seed tool and tests.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockwise_core::Promotion;

#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Gets a promotion by id, whatever its merchant or state. The
    /// PromotionValidator decides whether it applies.
    pub async fn get(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Promotion>> {
        let promotion = sqlx::query_as::<_, Promotion>(
            r#"
            SELECT id, merchant_id, shop_id, name, promotion_type, value,
                   min_spend_cents, start_date, end_date, is_active, created_at
            FROM promotions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(promotion)
    }

    pub async fn insert(&self, promotion: &Promotion) -> DbResult<()> {
        debug!(id = %promotion.id, merchant_id = %promotion.merchant_id, "Inserting promotion");

        sqlx::query(
            r#"
            INSERT INTO promotions (
                id, merchant_id, shop_id, name, promotion_type, value,
                min_spend_cents, start_date, end_date, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.merchant_id)
        .bind(&promotion.shop_id)
        .bind(&promotion.name)
        .bind(promotion.promotion_type)
        .bind(promotion.value)
        .bind(promotion.min_spend_cents)
        .bind(promotion.start_date)
        .bind(promotion.end_date)
        .bind(promotion.is_active)
        .bind(promotion.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
