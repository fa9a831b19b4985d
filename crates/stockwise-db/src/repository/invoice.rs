//! # Invoice Sequence
//!
//! Global counter behind invoice numbers.
//!
//! ```text
//! INSERT INTO invoice_sequences (name, last_value) VALUES ('invoice', 1)
//! ON CONFLICT (name) DO UPDATE SET last_value = last_value + 1
//! RETURNING last_value
//! ```
//!
//! The bump is a write on the caller's transaction, so it holds SQLite's
//! write lock until commit. Concurrent checkouts cannot read the same value,
//! and a rolled-back checkout gives its number back.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

const DEFAULT_SEQUENCE: &str = "invoice";

#[derive(Debug, Clone)]
pub struct InvoiceSequence {
    name: String,
}

impl Default for InvoiceSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceSequence {
    pub fn new() -> Self {
        InvoiceSequence {
            name: DEFAULT_SEQUENCE.to_string(),
        }
    }

    /// Returns the next value. Starts at 1.
    pub async fn next(&self, conn: &mut SqliteConnection) -> DbResult<i64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice_sequences (name, last_value) VALUES (?1, 1)
            ON CONFLICT (name) DO UPDATE SET last_value = last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(&self.name)
        .fetch_one(conn)
        .await?;

        debug!(sequence = %self.name, value, "Invoice sequence advanced");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_monotonic() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let seq = db.invoice_sequence();

        let mut tx = db.begin().await.unwrap();
        assert_eq!(seq.next(&mut tx).await.unwrap(), 1);
        assert_eq!(seq.next(&mut tx).await.unwrap(), 2);
        tx.commit().await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert_eq!(seq.next(&mut tx).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_rollback_returns_value() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let seq = db.invoice_sequence();

        let mut tx = db.begin().await.unwrap();
        assert_eq!(seq.next(&mut tx).await.unwrap(), 1);
        tx.rollback().await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert_eq!(seq.next(&mut tx).await.unwrap(), 1);
    }
}
