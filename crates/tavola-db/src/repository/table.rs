//! # Table Repository
//!
//! Single-table reads and simple writes for dining tables.
//!
//! The guarded moves (available → occupied on order open, occupied →
//! available on billing) live in the services, which run compare-and-set
//! updates inside transactions. This repository only covers the plain
//! CRUD surface.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tavola_core::Table;

/// Repository for dining table database operations.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Inserts a table row. A duplicate table_number surfaces as a
    /// UNIQUE violation from the database.
    pub async fn insert(&self, table: &Table) -> DbResult<()> {
        debug!(id = %table.id, number = %table.table_number, "Inserting table");

        sqlx::query(
            r#"
            INSERT INTO dining_tables (
                id, table_number, capacity, status, current_order_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&table.id)
        .bind(&table.table_number)
        .bind(table.capacity)
        .bind(table.status)
        .bind(&table.current_order_id)
        .bind(table.created_at)
        .bind(table.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a table by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Table>> {
        let table = sqlx::query_as::<_, Table>(
            r#"
            SELECT id, table_number, capacity, status, current_order_id,
                   created_at, updated_at
            FROM dining_tables
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Gets a table by its display number.
    pub async fn get_by_number(&self, table_number: &str) -> DbResult<Option<Table>> {
        let table = sqlx::query_as::<_, Table>(
            r#"
            SELECT id, table_number, capacity, status, current_order_id,
                   created_at, updated_at
            FROM dining_tables
            WHERE table_number = ?1
            "#,
        )
        .bind(table_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Lists every table, ordered by display number.
    pub async fn list_all(&self) -> DbResult<Vec<Table>> {
        let tables = sqlx::query_as::<_, Table>(
            r#"
            SELECT id, table_number, capacity, status, current_order_id,
                   created_at, updated_at
            FROM dining_tables
            ORDER BY table_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Deletes a table row. Occupancy checks happen in the registry
    /// service before this is called.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM dining_tables WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
