//! # Order Ledger
//!
//! The order lifecycle: open against a table, append line-items, walk
//! lines through the kitchen states, and close for payment.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                    │
//! │                                                                         │
//! │  1. OPEN                                                                │
//! │     └── open_order(table) → Order { status: open }                      │
//! │         (table flips available → occupied in the same transaction)     │
//! │                                                                         │
//! │  2. TAKE THE ORDER                                                      │
//! │     └── add_line() → OrderLine { pending, snapshot of name + price }    │
//! │     └── add_line() → OrderLine                                          │
//! │         (cached totals recomputed in the same transaction each time)   │
//! │                                                                         │
//! │  3. KITCHEN WALK                                                        │
//! │     └── set_line_status(pending → preparing → served)                   │
//! │     └── set_line_status(→ cancelled) drops the line from totals         │
//! │                                                                         │
//! │  4. CLOSE                                                               │
//! │     └── close_order() → Order { status: closed, totals frozen }         │
//! │         (refused when every line is cancelled)                         │
//! │                                                                         │
//! │  After close the line set is read-only; billing takes over.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use tavola_core::validation::{validate_order_size, validate_quantity};
use tavola_core::{
    compute_totals, DomainError, LineStatus, MenuItem, Order, OrderLine, OrderStatus, Table,
    TableStatus, TaxRate, Totals,
};

use crate::error::{DbError, ServiceResult};
use crate::repository::order::OrderRepository;
use crate::service::tables::TableRegistry;

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// A requested line-item, before the catalog snapshot is taken.
#[derive(Debug, Clone)]
pub struct LineDraft {
    pub menu_item_id: String,
    pub quantity: i64,
}

/// Result of opening an order: the order plus non-fatal warnings for
/// initial items that were skipped (currently unavailable on the menu).
#[derive(Debug)]
pub struct OpenedOrder {
    pub order: Order,
    pub warnings: Vec<String>,
}

// =============================================================================
// Order Ledger
// =============================================================================

/// Service for the order lifecycle and line-item operations.
#[derive(Debug, Clone)]
pub struct OrderLedger {
    pool: SqlitePool,
    tax_rate: TaxRate,
}

impl OrderLedger {
    /// Creates a new OrderLedger with the deployment tax rate.
    pub fn new(pool: SqlitePool, tax_rate: TaxRate) -> Self {
        OrderLedger { pool, tax_rate }
    }

    /// Gets an order by ID, or `OrderNotFound`.
    pub async fn get(&self, order_id: &str) -> ServiceResult<Order> {
        OrderRepository::new(self.pool.clone())
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(order_id.to_string()).into())
    }

    /// Gets an order's lines in stable append order.
    pub async fn lines(&self, order_id: &str) -> ServiceResult<Vec<OrderLine>> {
        // Surface NotFound for a bad ID rather than an empty list.
        self.get(order_id).await?;
        Ok(OrderRepository::new(self.pool.clone())
            .get_lines(order_id)
            .await?)
    }

    /// Lists orders in a given lifecycle status, oldest first.
    pub async fn list_by_status(&self, status: OrderStatus) -> ServiceResult<Vec<Order>> {
        Ok(OrderRepository::new(self.pool.clone())
            .list_by_status(status)
            .await?)
    }

    /// Lists the currently open orders, oldest first.
    pub async fn list_open(&self) -> ServiceResult<Vec<Order>> {
        self.list_by_status(OrderStatus::Open).await
    }

    /// Opens a new order against an available table.
    ///
    /// ## What This Does (one transaction)
    /// 1. Checks the table exists and is available
    /// 2. Inserts the order row with the table number snapshotted
    /// 3. Inserts the initial lines; unknown ids and items toggled
    ///    unavailable are skipped with a warning instead of failing the
    ///    whole open
    /// 4. Writes the cached totals for the inserted lines
    /// 5. Binds the table: compare-and-set available → occupied
    ///
    /// If the compare-and-set in step 5 matches zero rows, a concurrent
    /// open won the table between the pre-read and the update; everything
    /// rolls back and the caller gets a `Conflict`.
    pub async fn open_order(
        &self,
        table_id: &str,
        initial_items: &[LineDraft],
    ) -> ServiceResult<OpenedOrder> {
        for draft in initial_items {
            validate_quantity(draft.quantity).map_err(DomainError::from)?;
        }

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let table = fetch_table(&mut tx, table_id)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::TableNotFound(table_id.to_string()))?;

        if table.status != TableStatus::Available {
            return Err(DomainError::TableNotAvailable {
                table_number: table.table_number,
                status: table.status.to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let mut order = Order {
            id: Uuid::new_v4().to_string(),
            table_id: table.id.clone(),
            table_number: table.table_number.clone(),
            status: OrderStatus::Open,
            subtotal_cents: 0,
            tax_cents: 0,
            total_cents: 0,
            bill_id: None,
            opened_at: now,
            closed_at: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, table_id, table_number, status,
                subtotal_cents, tax_cents, total_cents,
                bill_id, opened_at, closed_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&order.id)
        .bind(&order.table_id)
        .bind(&order.table_number)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.total_cents)
        .bind(&order.bill_id)
        .bind(order.opened_at)
        .bind(order.closed_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let mut warnings = Vec::new();
        let mut lines: Vec<OrderLine> = Vec::new();

        for draft in initial_items {
            let item = match fetch_menu_item(&mut tx, &draft.menu_item_id)
                .await
                .map_err(DbError::from)?
            {
                Some(item) => item,
                None => {
                    warnings.push(format!(
                        "menu item '{}' was not found and was skipped",
                        draft.menu_item_id
                    ));
                    continue;
                }
            };

            if !item.is_available {
                warnings.push(format!("'{}' is unavailable and was skipped", item.name));
                continue;
            }

            let line = OrderLine {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                line_index: lines.len() as i64,
                menu_item_id: item.id.clone(),
                name_snapshot: item.name.clone(),
                unit_price_cents: item.price_cents,
                quantity: draft.quantity,
                status: LineStatus::Pending,
                created_at: now,
                updated_at: now,
            };
            insert_line(&mut tx, &line).await.map_err(DbError::from)?;
            lines.push(line);
        }

        let totals = compute_totals(&lines, self.tax_rate);
        write_totals(&mut tx, &order.id, &totals, OrderStatus::Open)
            .await
            .map_err(DbError::from)?;
        order.subtotal_cents = totals.subtotal_cents;
        order.tax_cents = totals.tax_cents;
        order.total_cents = totals.total_cents;

        let bound = TableRegistry::bind_order_tx(&mut *tx, &table.id, &order.id)
            .await
            .map_err(DbError::from)?;
        if bound == 0 {
            // A concurrent open took the table; dropping tx rolls back the
            // order and lines we just inserted.
            return Err(DomainError::Conflict {
                entity: "table",
                id: table.id,
            }
            .into());
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            order_id = %order.id,
            table = %order.table_number,
            lines = lines.len(),
            warnings = warnings.len(),
            "Order opened"
        );

        Ok(OpenedOrder { order, warnings })
    }

    /// Appends a line-item to an open order.
    ///
    /// Name and unit price are snapshotted from the catalog; the cached
    /// totals are recomputed in the same transaction.
    pub async fn add_line(
        &self,
        order_id: &str,
        menu_item_id: &str,
        quantity: i64,
    ) -> ServiceResult<OrderLine> {
        validate_quantity(quantity).map_err(DomainError::from)?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let order = require_order(&mut tx, order_id).await?;
        require_open(&order)?;

        let mut lines = fetch_lines(&mut tx, order_id).await.map_err(DbError::from)?;
        validate_order_size(lines.len()).map_err(DomainError::from)?;

        let item = fetch_menu_item(&mut tx, menu_item_id)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::MenuItemNotFound(menu_item_id.to_string()))?;

        if !item.is_available {
            return Err(DomainError::ItemUnavailable { name: item.name }.into());
        }

        let now = Utc::now();
        let line = OrderLine {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            line_index: lines.last().map(|l| l.line_index + 1).unwrap_or(0),
            menu_item_id: item.id.clone(),
            name_snapshot: item.name.clone(),
            unit_price_cents: item.price_cents,
            quantity,
            status: LineStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        insert_line(&mut tx, &line).await.map_err(DbError::from)?;

        lines.push(line.clone());
        let totals = compute_totals(&lines, self.tax_rate);
        let updated = write_totals(&mut tx, &order.id, &totals, OrderStatus::Open)
            .await
            .map_err(DbError::from)?;
        if updated == 0 {
            // Order was closed underneath us between pre-read and update.
            return Err(DomainError::Conflict {
                entity: "order",
                id: order.id,
            }
            .into());
        }

        tx.commit().await.map_err(DbError::from)?;

        debug!(
            order_id = %order_id,
            line_index = line.line_index,
            item = %line.name_snapshot,
            qty = quantity,
            "Line added"
        );

        Ok(line)
    }

    /// Moves a line-item through the kitchen state machine.
    ///
    /// ## Rules
    /// - The order must still be open; after close the line set is frozen
    /// - Transition validity is decided by `LineStatus::can_transition_to`
    /// - Re-asserting the current status is an idempotent no-op
    /// - Cancelling recomputes the cached totals in the same transaction
    pub async fn set_line_status(
        &self,
        order_id: &str,
        line_index: i64,
        next: LineStatus,
    ) -> ServiceResult<OrderLine> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let order = require_order(&mut tx, order_id).await?;
        require_open(&order)?;

        let mut line = fetch_line(&mut tx, order_id, line_index)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::OrderLineNotFound {
                order_id: order_id.to_string(),
                index: line_index,
            })?;

        if !line.status.can_transition_to(next) {
            return Err(DomainError::InvalidLineTransition {
                order_id: order_id.to_string(),
                index: line_index,
                from: line.status.to_string(),
                to: next.to_string(),
            }
            .into());
        }

        if line.status == next {
            // Idempotent no-op; nothing to write.
            return Ok(line);
        }

        let now = Utc::now();
        let updated = sqlx::query(
            r#"
            UPDATE order_lines
            SET status = ?1, updated_at = ?2
            WHERE id = ?3 AND status = ?4
            "#,
        )
        .bind(next)
        .bind(now)
        .bind(&line.id)
        .bind(line.status)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::Conflict {
                entity: "order line",
                id: line.id,
            }
            .into());
        }

        let from = line.status;
        line.status = next;
        line.updated_at = now;

        if next == LineStatus::Cancelled {
            // The line set changed for totals purposes; recompute in the
            // same transaction so readers never see stale cached totals.
            let lines = fetch_lines(&mut tx, order_id).await.map_err(DbError::from)?;
            let totals = compute_totals(&lines, self.tax_rate);
            let updated = write_totals(&mut tx, order_id, &totals, OrderStatus::Open)
                .await
                .map_err(DbError::from)?;
            if updated == 0 {
                return Err(DomainError::Conflict {
                    entity: "order",
                    id: order_id.to_string(),
                }
                .into());
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        debug!(
            order_id = %order_id,
            line_index,
            from = %from,
            to = %next,
            "Line status changed"
        );

        Ok(line)
    }

    /// Closes an open order, freezing its line set and totals.
    ///
    /// Refused with `NoActiveLineItems` when every line is cancelled:
    /// such an order has nothing to bill. (The table stays occupied; the
    /// party may still order, or staff can free the table explicitly.)
    pub async fn close_order(&self, order_id: &str) -> ServiceResult<Order> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let mut order = require_order(&mut tx, order_id).await?;
        require_open(&order)?;

        let lines = fetch_lines(&mut tx, order_id).await.map_err(DbError::from)?;
        if !lines.iter().any(|l| l.counts_towards_totals()) {
            return Err(DomainError::NoActiveLineItems(order_id.to_string()).into());
        }

        let totals = compute_totals(&lines, self.tax_rate);
        let now = Utc::now();

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'closed', closed_at = ?1,
                subtotal_cents = ?2, tax_cents = ?3, total_cents = ?4,
                updated_at = ?5
            WHERE id = ?6 AND status = 'open'
            "#,
        )
        .bind(now)
        .bind(totals.subtotal_cents)
        .bind(totals.tax_cents)
        .bind(totals.total_cents)
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::Conflict {
                entity: "order",
                id: order_id.to_string(),
            }
            .into());
        }

        tx.commit().await.map_err(DbError::from)?;

        order.status = OrderStatus::Closed;
        order.closed_at = Some(now);
        order.subtotal_cents = totals.subtotal_cents;
        order.tax_cents = totals.tax_cents;
        order.total_cents = totals.total_cents;
        order.updated_at = now;

        info!(order_id = %order_id, total = order.total_cents, "Order closed");
        Ok(order)
    }
}

// =============================================================================
// Transaction-Scoped Helpers
// =============================================================================

pub(crate) type Tx<'a> = sqlx::Transaction<'a, sqlx::Sqlite>;

async fn fetch_table(tx: &mut Tx<'_>, id: &str) -> Result<Option<Table>, sqlx::Error> {
    sqlx::query_as::<_, Table>(
        r#"
        SELECT id, table_number, capacity, status, current_order_id,
               created_at, updated_at
        FROM dining_tables
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

async fn fetch_menu_item(tx: &mut Tx<'_>, id: &str) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as::<_, MenuItem>(
        r#"
        SELECT id, name, description, category, price_cents, is_available,
               created_at, updated_at
        FROM menu_items
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

pub(crate) async fn fetch_order(
    tx: &mut Tx<'_>,
    id: &str,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        r#"
        SELECT id, table_id, table_number, status,
               subtotal_cents, tax_cents, total_cents,
               bill_id, opened_at, closed_at, created_at, updated_at
        FROM orders
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

pub(crate) async fn fetch_lines(
    tx: &mut Tx<'_>,
    order_id: &str,
) -> Result<Vec<OrderLine>, sqlx::Error> {
    sqlx::query_as::<_, OrderLine>(
        r#"
        SELECT id, order_id, line_index, menu_item_id, name_snapshot,
               unit_price_cents, quantity, status, created_at, updated_at
        FROM order_lines
        WHERE order_id = ?1
        ORDER BY line_index
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut **tx)
    .await
}

async fn fetch_line(
    tx: &mut Tx<'_>,
    order_id: &str,
    line_index: i64,
) -> Result<Option<OrderLine>, sqlx::Error> {
    sqlx::query_as::<_, OrderLine>(
        r#"
        SELECT id, order_id, line_index, menu_item_id, name_snapshot,
               unit_price_cents, quantity, status, created_at, updated_at
        FROM order_lines
        WHERE order_id = ?1 AND line_index = ?2
        "#,
    )
    .bind(order_id)
    .bind(line_index)
    .fetch_optional(&mut **tx)
    .await
}

async fn insert_line(tx: &mut Tx<'_>, line: &OrderLine) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO order_lines (
            id, order_id, line_index, menu_item_id, name_snapshot,
            unit_price_cents, quantity, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&line.id)
    .bind(&line.order_id)
    .bind(line.line_index)
    .bind(&line.menu_item_id)
    .bind(&line.name_snapshot)
    .bind(line.unit_price_cents)
    .bind(line.quantity)
    .bind(line.status)
    .bind(line.created_at)
    .bind(line.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Writes the cached totals, guarded on the expected order status so a
/// concurrent lifecycle transition surfaces as zero rows affected.
async fn write_totals(
    tx: &mut Tx<'_>,
    order_id: &str,
    totals: &Totals,
    expected: OrderStatus,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE orders
        SET subtotal_cents = ?1, tax_cents = ?2, total_cents = ?3, updated_at = ?4
        WHERE id = ?5 AND status = ?6
        "#,
    )
    .bind(totals.subtotal_cents)
    .bind(totals.tax_cents)
    .bind(totals.total_cents)
    .bind(Utc::now())
    .bind(order_id)
    .bind(expected)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Loads an order inside a transaction or fails with `OrderNotFound`.
async fn require_order(tx: &mut Tx<'_>, order_id: &str) -> ServiceResult<Order> {
    fetch_order(tx, order_id)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DomainError::OrderNotFound(order_id.to_string()).into())
}

/// Line and lifecycle edits require an open order.
fn require_open(order: &Order) -> ServiceResult<()> {
    if order.status != OrderStatus::Open {
        return Err(DomainError::OrderNotOpen {
            order_id: order.id.clone(),
            status: order.status.to_string(),
        }
        .into());
    }
    Ok(())
}
