//! # tavola-db: Database Layer and Services for Tavola POS
//!
//! SQLite persistence plus the cross-entity services (table registry,
//! order ledger, billing engine, kitchen projection, reports) built on it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Tavola POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Front of house / transport (out of scope)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tavola-db (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌─────────┐ ┌───────┐│   │
//! │  │   │  tables  │ │  orders  │ │ billing  │ │ kitchen │ │reports││   │
//! │  │   │ registry │ │  ledger  │ │  engine  │ │  view   │ │       ││   │
//! │  │   └────┬─────┘ └────┬─────┘ └────┬─────┘ └────┬────┘ └───┬───┘│   │
//! │  │        └────────────┴─────┬──────┴────────────┴──────────┘    │   │
//! │  │                           ▼                                     │   │
//! │  │        repositories → SqlitePool (WAL) → migrations             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        tavola-core: types, money math, state machines            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//! ```rust,ignore
//! use tavola_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./tavola.db")).await?;
//!
//! let table = db.tables().create_table("12", 4).await?;
//! let opened = db.orders().open_order(&table.id, &[]).await?;
//! db.orders().add_line(&opened.order.id, &item_id, 2).await?;
//! let order = db.orders().close_order(&opened.order.id).await?;
//! let bill = db.billing().finalize_bill(&order.id, 0, PaymentMethod::Cash).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};
pub use service::billing::BillingEngine;
pub use service::kitchen::{KitchenQueueProjection, KitchenTicketLine};
pub use service::orders::{LineDraft, OpenedOrder, OrderLedger};
pub use service::reports::{ItemSales, Reports, SalesSummary};
pub use service::tables::TableRegistry;
