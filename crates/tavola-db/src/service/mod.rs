//! # Service Module
//!
//! Cross-entity business operations for Tavola POS.
//!
//! ## Why a Service Layer?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Services vs Repositories                              │
//! │                                                                         │
//! │  Repositories answer "read/write one table".                           │
//! │  Services answer "run one business operation correctly":               │
//! │                                                                         │
//! │  OrderLedger::open_order                                                │
//! │  ├── check table is available                                           │
//! │  ├── insert order row                                                   │
//! │  ├── insert initial lines + cached totals                               │
//! │  └── bind table (compare-and-set)        ← ALL in ONE transaction      │
//! │                                                                         │
//! │  BillingEngine::finalize_bill                                           │
//! │  ├── insert bill + frozen line snapshots                                │
//! │  ├── flip order closed → billed (compare-and-set)                      │
//! │  └── release the table                   ← ALL in ONE transaction      │
//! │                                                                         │
//! │  A reader can never observe half of one of these steps.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Model
//!
//! Every guarded transition is a compare-and-set UPDATE:
//! `UPDATE ... SET status = <next> WHERE id = ?1 AND status = <expected>`.
//! Zero rows affected after a passing pre-read means a concurrent writer
//! won the race; the service rolls back and returns a `Conflict` the
//! caller may retry after re-reading.
//!
//! ## Available Services
//!
//! - [`tables::TableRegistry`] - Floor plan and occupancy
//! - [`orders::OrderLedger`] - Order lifecycle and line-items
//! - [`billing::BillingEngine`] - One-shot bill finalization
//! - [`kitchen::KitchenQueueProjection`] - Read-only kitchen display feed
//! - [`reports::Reports`] - Read-only sales aggregates

pub mod billing;
pub mod kitchen;
pub mod orders;
pub mod reports;
pub mod tables;
