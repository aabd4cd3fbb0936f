//! # Billing Engine
//!
//! One-shot bill finalization for closed orders.
//!
//! ## Finalize Steps (one transaction)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   finalize_bill(order, discount, method)                │
//! │                                                                         │
//! │  1. Load the order; must exist and be closed                           │
//! │     ├── open   → OrderNotClosed                                        │
//! │     └── billed → AlreadyBilled                                         │
//! │  2. Validate discount >= 0                                             │
//! │  3. total = max(0, frozen order total − discount)                      │
//! │  4. INSERT bill + frozen line snapshots                                │
//! │     └── UNIQUE(order_id) violation → AlreadyBilled (lost the race)     │
//! │  5. UPDATE orders SET status='billed' WHERE status='closed'  (CAS)     │
//! │  6. Release the table (occupied → available, order ref cleared)        │
//! │  7. COMMIT                                                             │
//! │                                                                         │
//! │  The UNIQUE constraint in step 4 is the correctness mechanism for      │
//! │  one-bill-per-order; the status checks only give friendlier errors.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use tavola_core::{
    final_bill_total, Bill, BillLine, DomainError, Money, OrderStatus, PaymentMethod,
    PaymentStatus, TaxRate,
};

use crate::error::{DbError, ServiceResult};
use crate::repository::bill::BillRepository;
use crate::service::orders::{fetch_lines, fetch_order};
use crate::service::tables::TableRegistry;

/// Service producing the immutable financial record for a closed order.
#[derive(Debug, Clone)]
pub struct BillingEngine {
    pool: SqlitePool,
    tax_rate: TaxRate,
}

impl BillingEngine {
    /// Creates a new BillingEngine with the deployment tax rate.
    pub fn new(pool: SqlitePool, tax_rate: TaxRate) -> Self {
        BillingEngine { pool, tax_rate }
    }

    /// Gets a bill by ID.
    pub async fn get(&self, bill_id: &str) -> ServiceResult<Option<Bill>> {
        Ok(BillRepository::new(self.pool.clone()).get_by_id(bill_id).await?)
    }

    /// Gets the bill for an order, if it has been finalized.
    pub async fn get_for_order(&self, order_id: &str) -> ServiceResult<Option<Bill>> {
        Ok(BillRepository::new(self.pool.clone())
            .get_by_order(order_id)
            .await?)
    }

    /// Gets a bill's frozen line snapshots.
    pub async fn bill_lines(&self, bill_id: &str) -> ServiceResult<Vec<BillLine>> {
        Ok(BillRepository::new(self.pool.clone()).get_lines(bill_id).await?)
    }

    /// Finalizes the bill for a closed order. Happens at most once per
    /// order; a second call returns `AlreadyBilled`.
    pub async fn finalize_bill(
        &self,
        order_id: &str,
        discount_cents: i64,
        payment_method: PaymentMethod,
    ) -> ServiceResult<Bill> {
        if discount_cents < 0 {
            return Err(DomainError::InvalidDiscount(discount_cents).into());
        }

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let order = fetch_order(&mut tx, order_id)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::OrderNotFound(order_id.to_string()))?;

        match order.status {
            OrderStatus::Closed => {}
            OrderStatus::Billed => {
                return Err(DomainError::AlreadyBilled(order_id.to_string()).into())
            }
            OrderStatus::Open => {
                return Err(DomainError::OrderNotClosed {
                    order_id: order_id.to_string(),
                    status: order.status.to_string(),
                }
                .into())
            }
        }

        // Totals were frozen at close; the bill copies them verbatim and
        // only the discount is applied on top.
        let total = final_bill_total(order.total(), Money::from_cents(discount_cents));
        let now = Utc::now();

        let bill = Bill {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            table_number: order.table_number.clone(),
            subtotal_cents: order.subtotal_cents,
            tax_cents: order.tax_cents,
            tax_rate_bps: self.tax_rate.bps() as i64,
            discount_cents,
            total_cents: total.cents(),
            payment_method,
            payment_status: PaymentStatus::Paid,
            billed_at: now,
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO bills (
                id, order_id, table_number,
                subtotal_cents, tax_cents, tax_rate_bps, discount_cents, total_cents,
                payment_method, payment_status, billed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&bill.id)
        .bind(&bill.order_id)
        .bind(&bill.table_number)
        .bind(bill.subtotal_cents)
        .bind(bill.tax_cents)
        .bind(bill.tax_rate_bps)
        .bind(bill.discount_cents)
        .bind(bill.total_cents)
        .bind(bill.payment_method)
        .bind(bill.payment_status)
        .bind(bill.billed_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            let db_err = DbError::from(e);
            // Two finalizes raced past the status check; the UNIQUE
            // constraint on bills.order_id let exactly one through.
            if db_err.is_unique_violation_on("order_id") {
                return Err(DomainError::AlreadyBilled(order_id.to_string()).into());
            }
            return Err(db_err.into());
        }

        // Freeze the non-cancelled lines onto the bill.
        let lines = fetch_lines(&mut tx, order_id).await.map_err(DbError::from)?;
        for line in lines.iter().filter(|l| l.counts_towards_totals()) {
            sqlx::query(
                r#"
                INSERT INTO bill_lines (
                    id, bill_id, menu_item_id, name_snapshot, unit_price_cents, quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&bill.id)
            .bind(&line.menu_item_id)
            .bind(&line.name_snapshot)
            .bind(line.unit_price_cents)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        // closed → billed, compare-and-set.
        let flipped = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'billed', bill_id = ?1, updated_at = ?2
            WHERE id = ?3 AND status = 'closed'
            "#,
        )
        .bind(&bill.id)
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if flipped.rows_affected() == 0 {
            return Err(DomainError::Conflict {
                entity: "order",
                id: order_id.to_string(),
            }
            .into());
        }

        // Release the table. The primary path is keyed by table_id; if the
        // table row was renumbered or recreated since the order opened,
        // fall back to the denormalized display number. Either way a table
        // that is already free is not an error.
        let released = TableRegistry::release_tx(&mut *tx, &order.table_id, order_id)
            .await
            .map_err(DbError::from)?;
        if released == 0 {
            warn!(
                order_id = %order_id,
                table_id = %order.table_id,
                table = %order.table_number,
                "Table not released by id; trying by display number"
            );
            let fallback =
                TableRegistry::release_by_number_tx(&mut *tx, &order.table_number, order_id)
                    .await
                    .map_err(DbError::from)?;
            if fallback == 0 {
                warn!(
                    order_id = %order_id,
                    table = %order.table_number,
                    "No occupied table bound to this order; nothing to release"
                );
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            bill_id = %bill.id,
            order_id = %order_id,
            table = %bill.table_number,
            total = bill.total_cents,
            method = %payment_method,
            "Bill finalized"
        );

        Ok(bill)
    }
}
