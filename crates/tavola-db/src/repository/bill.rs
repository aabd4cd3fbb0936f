//! # Bill Repository
//!
//! Read access to finalized bills.
//!
//! Bills are written exactly once, by `BillingEngine::finalize_bill` inside
//! its transaction. After that they are immutable, so the repository only
//! ever reads.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use tavola_core::{Bill, BillLine};

/// Repository for bill database reads.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Gets a bill by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Bill>> {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            SELECT id, order_id, table_number,
                   subtotal_cents, tax_cents, tax_rate_bps, discount_cents, total_cents,
                   payment_method, payment_status, billed_at
            FROM bills
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bill)
    }

    /// Gets the bill (if any) for an order. At most one can exist.
    pub async fn get_by_order(&self, order_id: &str) -> DbResult<Option<Bill>> {
        let bill = sqlx::query_as::<_, Bill>(
            r#"
            SELECT id, order_id, table_number,
                   subtotal_cents, tax_cents, tax_rate_bps, discount_cents, total_cents,
                   payment_method, payment_status, billed_at
            FROM bills
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bill)
    }

    /// Gets the frozen line snapshots of a bill.
    pub async fn get_lines(&self, bill_id: &str) -> DbResult<Vec<BillLine>> {
        let lines = sqlx::query_as::<_, BillLine>(
            r#"
            SELECT id, bill_id, menu_item_id, name_snapshot, unit_price_cents, quantity
            FROM bill_lines
            WHERE bill_id = ?1
            "#,
        )
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists bills settled within a half-open time window, newest first.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Bill>> {
        let bills = sqlx::query_as::<_, Bill>(
            r#"
            SELECT id, order_id, table_number,
                   subtotal_cents, tax_cents, tax_rate_bps, discount_cents, total_cents,
                   payment_method, payment_status, billed_at
            FROM bills
            WHERE billed_at >= ?1 AND billed_at < ?2
            ORDER BY billed_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(bills)
    }
}
