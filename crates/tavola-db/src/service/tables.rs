//! # Table Registry
//!
//! Floor plan management: creating, listing, and retiring dining tables,
//! plus the occupancy state machine.
//!
//! ## Occupancy Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Table Occupancy                                     │
//! │                                                                         │
//! │  available ◄────────────────────┐                                       │
//! │      │                          │                                       │
//! │      │ bind_order (CAS,         │ release (on billing, or an           │
//! │      │  OrderLedger only)       │  explicit operator set_status)       │
//! │      ▼                          │                                       │
//! │  occupied ──────────────────────┘                                       │
//! │                                                                         │
//! │  reserved / cleaning: operator-set freely via set_status.              │
//! │                                                                         │
//! │  Invariant: current_order_id is set iff status = occupied, and every   │
//! │  transition to available clears it.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use tavola_core::validation::{validate_capacity, validate_table_number};
use tavola_core::{DomainError, Table, TableStatus};

use crate::error::{DbError, ServiceResult};
use crate::repository::table::TableRepository;

/// Service for floor plan and occupancy operations.
#[derive(Debug, Clone)]
pub struct TableRegistry {
    pool: SqlitePool,
}

impl TableRegistry {
    /// Creates a new TableRegistry.
    pub fn new(pool: SqlitePool) -> Self {
        TableRegistry { pool }
    }

    fn repo(&self) -> TableRepository {
        TableRepository::new(self.pool.clone())
    }

    /// Registers a new table on the floor plan.
    ///
    /// The display number must be unique; the UNIQUE constraint on
    /// `dining_tables.table_number` is authoritative, so two concurrent
    /// creates with the same number cannot both succeed.
    pub async fn create_table(&self, table_number: &str, capacity: i64) -> ServiceResult<Table> {
        validate_table_number(table_number).map_err(DomainError::from)?;
        validate_capacity(capacity).map_err(DomainError::from)?;

        let now = Utc::now();
        let table = Table {
            id: Uuid::new_v4().to_string(),
            table_number: table_number.trim().to_string(),
            capacity,
            status: TableStatus::Available,
            current_order_id: None,
            created_at: now,
            updated_at: now,
        };

        match self.repo().insert(&table).await {
            Ok(()) => {
                info!(id = %table.id, number = %table.table_number, "Table created");
                Ok(table)
            }
            Err(e) if e.is_unique_violation_on("table_number") => {
                Err(DomainError::DuplicateTableNumber(table.table_number).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Gets a table by ID, or `TableNotFound`.
    pub async fn get(&self, table_id: &str) -> ServiceResult<Table> {
        self.repo()
            .get_by_id(table_id)
            .await?
            .ok_or_else(|| DomainError::TableNotFound(table_id.to_string()).into())
    }

    /// Gets a table by its display number, or `TableNotFound`.
    pub async fn get_by_number(&self, table_number: &str) -> ServiceResult<Table> {
        self.repo()
            .get_by_number(table_number)
            .await?
            .ok_or_else(|| DomainError::TableNotFound(table_number.to_string()).into())
    }

    /// Lists every table, ordered by display number.
    pub async fn list(&self) -> ServiceResult<Vec<Table>> {
        Ok(self.repo().list_all().await?)
    }

    /// Operator-initiated status change (reserve, mark for cleaning, free).
    ///
    /// Any target status is accepted, and setting the current status again
    /// is an idempotent no-op. Every transition to `available` clears the
    /// bound order reference so the occupancy invariant holds.
    pub async fn set_status(&self, table_id: &str, status: TableStatus) -> ServiceResult<Table> {
        let result = if status == TableStatus::Available {
            sqlx::query(
                r#"
                UPDATE dining_tables
                SET status = ?1, current_order_id = NULL, updated_at = ?2
                WHERE id = ?3
                "#,
            )
            .bind(status)
            .bind(Utc::now())
            .bind(table_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?
        } else {
            sqlx::query(
                r#"
                UPDATE dining_tables
                SET status = ?1, updated_at = ?2
                WHERE id = ?3
                "#,
            )
            .bind(status)
            .bind(Utc::now())
            .bind(table_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?
        };

        if result.rows_affected() == 0 {
            return Err(DomainError::TableNotFound(table_id.to_string()).into());
        }

        debug!(id = %table_id, status = %status, "Table status set");
        self.get(table_id).await
    }

    /// Removes a table from the floor plan.
    ///
    /// Refused while the table is occupied: the open order must be billed
    /// or cancelled first, so no order is ever orphaned by a deletion.
    pub async fn delete(&self, table_id: &str) -> ServiceResult<()> {
        let table = self.get(table_id).await?;

        if table.status == TableStatus::Occupied {
            return Err(DomainError::TableOccupied {
                table_number: table.table_number,
            }
            .into());
        }

        self.repo().delete(table_id).await?;
        info!(id = %table_id, number = %table.table_number, "Table deleted");
        Ok(())
    }

    // --- Guarded moves, called inside service transactions -------------------

    /// Compare-and-set: available → occupied, binding the open order.
    ///
    /// Returns the number of rows updated. Zero means the table was not
    /// available at update time (a concurrent open won), and the calling
    /// transaction must roll back.
    pub(crate) async fn bind_order_tx(
        conn: &mut SqliteConnection,
        table_id: &str,
        order_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE dining_tables
            SET status = 'occupied', current_order_id = ?1, updated_at = ?2
            WHERE id = ?3 AND status = 'available'
            "#,
        )
        .bind(order_id)
        .bind(Utc::now())
        .bind(table_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Releases the table bound to an order: occupied → available.
    ///
    /// Guarded on `current_order_id` so only the order that owns the table
    /// can release it. Returns the number of rows updated.
    pub(crate) async fn release_tx(
        conn: &mut SqliteConnection,
        table_id: &str,
        order_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE dining_tables
            SET status = 'available', current_order_id = NULL, updated_at = ?1
            WHERE id = ?2 AND current_order_id = ?3
            "#,
        )
        .bind(Utc::now())
        .bind(table_id)
        .bind(order_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Fallback release keyed by the denormalized display number, for the
    /// case where the table row was renumbered or recreated since the
    /// order was opened.
    pub(crate) async fn release_by_number_tx(
        conn: &mut SqliteConnection,
        table_number: &str,
        order_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE dining_tables
            SET status = 'available', current_order_id = NULL, updated_at = ?1
            WHERE table_number = ?2 AND current_order_id = ?3
            "#,
        )
        .bind(Utc::now())
        .bind(table_number)
        .bind(order_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
