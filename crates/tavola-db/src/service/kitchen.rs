//! # Kitchen Queue Projection
//!
//! Read-only feed for the kitchen display: every in-flight line-item of
//! every open order, in cooking priority order.
//!
//! ## Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Oldest order first (opened_at ascending) - FIFO across tables      │
//! │  2. Within an order: preparing before pending - finish started dishes  │
//! │  3. Within a status: stable line_index order                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is a projection recomputed from orders and their lines on every
//! call. It holds no state of its own: a line cancelled mid-preparation
//! simply stops appearing on the next read.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use tavola_core::LineStatus;

use crate::error::DbResult;

/// One row on the kitchen display.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct KitchenTicketLine {
    pub order_id: String,
    pub table_number: String,
    pub line_index: i64,
    pub name_snapshot: String,
    pub quantity: i64,
    pub status: LineStatus,
    pub opened_at: DateTime<Utc>,
}

/// Read-only projection of the kitchen's work queue.
#[derive(Debug, Clone)]
pub struct KitchenQueueProjection {
    pool: SqlitePool,
}

impl KitchenQueueProjection {
    /// Creates a new KitchenQueueProjection.
    pub fn new(pool: SqlitePool) -> Self {
        KitchenQueueProjection { pool }
    }

    /// Lists every pending or preparing line of every open order, in
    /// cooking priority order.
    ///
    /// Lines of closed or billed orders never appear, whatever their line
    /// status: once an order leaves the floor it leaves the kitchen.
    pub async fn list_in_flight(&self) -> DbResult<Vec<KitchenTicketLine>> {
        let rows = sqlx::query_as::<_, KitchenTicketLine>(
            r#"
            SELECT o.id AS order_id,
                   o.table_number,
                   l.line_index,
                   l.name_snapshot,
                   l.quantity,
                   l.status,
                   o.opened_at
            FROM order_lines l
            JOIN orders o ON o.id = l.order_id
            WHERE o.status = 'open'
              AND l.status IN ('pending', 'preparing')
            ORDER BY o.opened_at ASC,
                     CASE l.status WHEN 'preparing' THEN 0 ELSE 1 END,
                     l.line_index ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
