//! # Reports
//!
//! Read-only sales aggregates over finalized bills.
//!
//! Reports never touch live orders: they aggregate the immutable bill
//! records, so a report taken during service is always internally
//! consistent.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;

/// Aggregated sales for a time window.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesSummary {
    pub bill_count: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

/// Sales of one menu item within a time window.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ItemSales {
    pub menu_item_id: String,
    pub name_snapshot: String,
    pub total_quantity: i64,
    pub total_cents: i64,
}

/// Read-only reporting service over finalized bills.
#[derive(Debug, Clone)]
pub struct Reports {
    pool: SqlitePool,
}

impl Reports {
    /// Creates a new Reports service.
    pub fn new(pool: SqlitePool) -> Self {
        Reports { pool }
    }

    /// Sales summary for the last 24 hours.
    pub async fn today_summary(&self) -> DbResult<SalesSummary> {
        let to = Utc::now();
        let from = to - Duration::hours(24);
        self.summary_between(from, to).await
    }

    /// Sales summary over a half-open window `[from, to)`.
    pub async fn summary_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<SalesSummary> {
        let summary = sqlx::query_as::<_, SalesSummary>(
            r#"
            SELECT COUNT(*)                        AS bill_count,
                   COALESCE(SUM(subtotal_cents), 0) AS subtotal_cents,
                   COALESCE(SUM(tax_cents), 0)      AS tax_cents,
                   COALESCE(SUM(discount_cents), 0) AS discount_cents,
                   COALESCE(SUM(total_cents), 0)    AS total_cents
            FROM bills
            WHERE billed_at >= ?1 AND billed_at < ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Top-selling items by quantity over a half-open window `[from, to)`.
    pub async fn top_items(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<ItemSales>> {
        let items = sqlx::query_as::<_, ItemSales>(
            r#"
            SELECT bl.menu_item_id,
                   bl.name_snapshot,
                   SUM(bl.quantity)                         AS total_quantity,
                   SUM(bl.unit_price_cents * bl.quantity)   AS total_cents
            FROM bill_lines bl
            JOIN bills b ON b.id = bl.bill_id
            WHERE b.billed_at >= ?1 AND b.billed_at < ?2
            GROUP BY bl.menu_item_id, bl.name_snapshot
            ORDER BY total_quantity DESC, total_cents DESC
            LIMIT ?3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
