//! # Stock Ledger
//!
//! Owns per-(shop, item) quantity and the append-only movement log.
//!
//! ## Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE shop_stock                                                      │
//! │     SET quantity = quantity - :qty                                      │
//! │   WHERE shop_id = :shop AND item_id = :item AND quantity >= :qty        │
//! │  RETURNING quantity                                                     │
//! │                                                                         │
//! │  Terminal A: sells 7 of 10 ──► row matched, quantity = 3                │
//! │  Terminal B: sells 5 of 10 ──► guard sees 3 < 5, no row touched         │
//! │                                                                         │
//! │  The compare and the write are one statement, so there is no window     │
//! │  between "check" and "decrement" for another writer to slip into.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no read-then-write and no in-process cache of quantities.
//!
//! Every mutation must be paired with [`StockLedger::record_movement`] on
//! the same connection, inside the same transaction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use stockwise_core::{MovementType, ShopStock, StockMovement};

/// Result of a guarded decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// The guard held; `new_quantity` is the committed-to-be value.
    Applied { new_quantity: i64 },
    /// The guard failed and nothing was written.
    Insufficient { available: i64 },
}

/// A ledger entry about to be written.
#[derive(Debug, Clone)]
pub struct NewMovement<'a> {
    pub shop_id: &'a str,
    pub item_id: &'a str,
    pub user_id: &'a str,
    pub movement_type: MovementType,
    pub quantity_changed: i64,
    pub new_quantity_after: i64,
    pub reason: Option<&'a str>,
    pub reference_id: Option<&'a str>,
}

/// Repository for shop stock and stock movements.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    // =========================================================================
    // Mutations (inside the caller's transaction)
    // =========================================================================

    /// Subtracts `qty` only if at least `qty` is on hand.
    pub async fn decrement(
        &self,
        conn: &mut SqliteConnection,
        shop_id: &str,
        item_id: &str,
        qty: i64,
    ) -> DbResult<Decrement> {
        let now = Utc::now();

        let new_quantity: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE shop_stock
            SET quantity = quantity - ?3,
                updated_at = ?4
            WHERE shop_id = ?1 AND item_id = ?2 AND quantity >= ?3
            RETURNING quantity
            "#,
        )
        .bind(shop_id)
        .bind(item_id)
        .bind(qty)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        match new_quantity {
            Some(new_quantity) => {
                debug!(shop_id = %shop_id, item_id = %item_id, qty, new_quantity, "Stock decremented");
                Ok(Decrement::Applied { new_quantity })
            }
            None => {
                // Only for the error message; the decision was already made.
                let available = self.quantity_in(conn, shop_id, item_id).await?.unwrap_or(0);
                debug!(shop_id = %shop_id, item_id = %item_id, qty, available, "Stock guard failed");
                Ok(Decrement::Insufficient { available })
            }
        }
    }

    /// Adds `qty`, creating the row at `qty` if absent.
    ///
    /// `stocked_in_at` is recorded as `last_stocked_in_at` when given
    /// (stock-in), and left untouched otherwise (transfers, adjustments).
    pub async fn increment(
        &self,
        conn: &mut SqliteConnection,
        shop_id: &str,
        item_id: &str,
        qty: i64,
        stocked_in_at: Option<DateTime<Utc>>,
    ) -> DbResult<i64> {
        let now = Utc::now();

        let new_quantity: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO shop_stock (shop_id, item_id, quantity, last_stocked_in_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (shop_id, item_id) DO UPDATE SET
                quantity = quantity + excluded.quantity,
                last_stocked_in_at = COALESCE(excluded.last_stocked_in_at, last_stocked_in_at),
                updated_at = excluded.updated_at
            RETURNING quantity
            "#,
        )
        .bind(shop_id)
        .bind(item_id)
        .bind(qty)
        .bind(stocked_in_at)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        debug!(shop_id = %shop_id, item_id = %item_id, qty, new_quantity, "Stock incremented");
        Ok(new_quantity)
    }

    /// Appends a ledger row.
    pub async fn record_movement(
        &self,
        conn: &mut SqliteConnection,
        movement: NewMovement<'_>,
    ) -> DbResult<StockMovement> {
        let row = StockMovement {
            id: Uuid::new_v4().to_string(),
            item_id: movement.item_id.to_string(),
            shop_id: movement.shop_id.to_string(),
            user_id: movement.user_id.to_string(),
            movement_type: movement.movement_type,
            quantity_changed: movement.quantity_changed,
            new_quantity_after: movement.new_quantity_after,
            reason: movement.reason.map(str::to_string),
            reference_id: movement.reference_id.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, item_id, shop_id, user_id, movement_type,
                quantity_changed, new_quantity_after, reason, reference_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&row.id)
        .bind(&row.item_id)
        .bind(&row.shop_id)
        .bind(&row.user_id)
        .bind(row.movement_type)
        .bind(row.quantity_changed)
        .bind(row.new_quantity_after)
        .bind(&row.reason)
        .bind(&row.reference_id)
        .bind(row.created_at)
        .execute(conn)
        .await?;

        debug!(
            id = %row.id,
            movement_type = row.movement_type.as_str(),
            quantity_changed = row.quantity_changed,
            "Movement recorded"
        );
        Ok(row)
    }

    /// Current quantity as seen by `conn` (inside a transaction, that
    /// includes its own uncommitted writes).
    pub async fn quantity_in(
        &self,
        conn: &mut SqliteConnection,
        shop_id: &str,
        item_id: &str,
    ) -> DbResult<Option<i64>> {
        let quantity: Option<i64> =
            sqlx::query_scalar("SELECT quantity FROM shop_stock WHERE shop_id = ?1 AND item_id = ?2")
                .bind(shop_id)
                .bind(item_id)
                .fetch_optional(conn)
                .await?;

        Ok(quantity)
    }

    // =========================================================================
    // Reads (committed state)
    // =========================================================================

    pub async fn get(&self, shop_id: &str, item_id: &str) -> DbResult<Option<ShopStock>> {
        let stock = sqlx::query_as::<_, ShopStock>(
            r#"
            SELECT shop_id, item_id, quantity, last_stocked_in_at, updated_at
            FROM shop_stock
            WHERE shop_id = ?1 AND item_id = ?2
            "#,
        )
        .bind(shop_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stock)
    }

    /// Movements for one (shop, item), newest first.
    pub async fn movements(
        &self,
        shop_id: &str,
        item_id: &str,
        limit: i64,
    ) -> DbResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, item_id, shop_id, user_id, movement_type,
                   quantity_changed, new_quantity_after, reason, reference_id, created_at
            FROM stock_movements
            WHERE shop_id = ?1 AND item_id = ?2
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?3
            "#,
        )
        .bind(shop_id)
        .bind(item_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Movements written for a sale or transfer, oldest first.
    pub async fn movements_for_reference(&self, reference_id: &str) -> DbResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, item_id, shop_id, user_id, movement_type,
                   quantity_changed, new_quantity_after, reason, reference_id, created_at
            FROM stock_movements
            WHERE reference_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_movements(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
