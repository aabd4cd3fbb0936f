//! # Menu Repository
//!
//! Database operations for the menu catalog.
//!
//! The catalog is deliberately simple: items are created, toggled available
//! or unavailable, and read by the order machinery. Order lines snapshot
//! name and price at add-time, so catalog edits never rewrite history.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult, ServiceResult};
use tavola_core::validation::{validate_item_name, validate_price_cents, validate_search_query};
use tavola_core::{DomainError, MenuItem};

/// Repository for menu item database operations.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    /// Creates a new MenuRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    /// Creates a new menu item, available by default.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        category: &str,
        price_cents: i64,
    ) -> ServiceResult<MenuItem> {
        validate_item_name(name).map_err(DomainError::from)?;
        validate_price_cents(price_cents).map_err(DomainError::from)?;

        let now = Utc::now();
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            description: description.map(|d| d.to_string()),
            category: category.trim().to_string(),
            price_cents,
            is_available: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, name = %item.name, "Creating menu item");

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, name, description, category, price_cents, is_available,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.category)
        .bind(item.price_cents)
        .bind(item.is_available)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(item)
    }

    /// Gets a menu item by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let item = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT id, name, description, category, price_cents, is_available,
                   created_at, updated_at
            FROM menu_items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists all items, grouped by category then name.
    pub async fn list_all(&self) -> DbResult<Vec<MenuItem>> {
        let items = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT id, name, description, category, price_cents, is_available,
                   created_at, updated_at
            FROM menu_items
            ORDER BY category, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists only the items that can currently be ordered.
    pub async fn list_available(&self) -> DbResult<Vec<MenuItem>> {
        let items = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT id, name, description, category, price_cents, is_available,
                   created_at, updated_at
            FROM menu_items
            WHERE is_available = 1
            ORDER BY category, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Case-insensitive substring search over item names.
    pub async fn search(&self, query: &str, limit: i64) -> ServiceResult<Vec<MenuItem>> {
        let query = validate_search_query(query).map_err(DomainError::from)?;
        let pattern = format!("%{}%", query);

        let items = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT id, name, description, category, price_cents, is_available,
                   created_at, updated_at
            FROM menu_items
            WHERE name LIKE ?1 COLLATE NOCASE
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(items)
    }

    /// Toggles an item's availability without touching orders that already
    /// reference it (their snapshots are frozen).
    pub async fn set_availability(&self, id: &str, available: bool) -> ServiceResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE menu_items
            SET is_available = ?1, updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(available)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MenuItemNotFound(id.to_string()).into());
        }

        debug!(id = %id, available, "Menu item availability updated");
        Ok(())
    }

    /// Removes an item from the catalog. Order and bill lines keep their
    /// snapshots, so history is unaffected.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MenuItemNotFound(id.to_string()).into());
        }

        debug!(id = %id, "Menu item deleted");
        Ok(())
    }

    /// Updates an item's price. Existing order lines keep their snapshot.
    pub async fn update_price(&self, id: &str, price_cents: i64) -> ServiceResult<()> {
        validate_price_cents(price_cents).map_err(DomainError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE menu_items
            SET price_cents = ?1, updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(price_cents)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MenuItemNotFound(id.to_string()).into());
        }

        Ok(())
    }
}
