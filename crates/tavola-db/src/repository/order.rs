//! # Order Repository
//!
//! Read access to orders and their line-items.
//!
//! All mutation of orders is cross-entity (a line edit recomputes cached
//! totals, closing an order checks the line set, billing flips the table)
//! and therefore lives in the `OrderLedger` and `BillingEngine` services,
//! inside transactions. The repository stays read-only.

use sqlx::SqlitePool;

use crate::error::DbResult;
use tavola_core::{Order, OrderLine, OrderStatus};

/// Repository for order database reads.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, table_id, table_number, status,
                   subtotal_cents, tax_cents, total_cents,
                   bill_id, opened_at, closed_at, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all lines of an order in their stable append order.
    pub async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, order_id, line_index, menu_item_id, name_snapshot,
                   unit_price_cents, quantity, status, created_at, updated_at
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY line_index
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Gets a single line by its stable index within an order.
    pub async fn get_line(&self, order_id: &str, line_index: i64) -> DbResult<Option<OrderLine>> {
        let line = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, order_id, line_index, menu_item_id, name_snapshot,
                   unit_price_cents, quantity, status, created_at, updated_at
            FROM order_lines
            WHERE order_id = ?1 AND line_index = ?2
            "#,
        )
        .bind(order_id)
        .bind(line_index)
        .fetch_optional(&self.pool)
        .await?;

        Ok(line)
    }

    /// Lists orders in a given lifecycle status, oldest first.
    pub async fn list_by_status(&self, status: OrderStatus) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, table_id, table_number, status,
                   subtotal_cents, tax_cents, total_cents,
                   bill_id, opened_at, closed_at, created_at, updated_at
            FROM orders
            WHERE status = ?1
            ORDER BY opened_at
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}
