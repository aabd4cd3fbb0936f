//! # Repository Module
//!
//! Database repository implementations for Tavola POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service (OrderLedger, BillingEngine, ...)                             │
//! │       │                                                                 │
//! │       │  db.order_repo().get_by_id(order_id)                           │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── get_lines(&self, order_id)                                        │
//! │  └── list_by_status(&self, status)                                     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories hold single-table reads and simple writes. Multi-write   │
//! │  steps that must be atomic (open order + bind table, finalize bill)    │
//! │  live in the services, which run them inside one transaction.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`menu::MenuRepository`] - Menu catalog CRUD and search
//! - [`table::TableRepository`] - Dining table reads and simple writes
//! - [`order::OrderRepository`] - Order and line-item reads
//! - [`bill::BillRepository`] - Bill reads and reporting aggregates

pub mod bill;
pub mod menu;
pub mod order;
pub mod table;
