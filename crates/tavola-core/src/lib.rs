//! # tavola-core: Pure Business Logic for Tavola POS
//!
//! This crate is the **heart** of Tavola POS, a dine-in restaurant
//! point-of-sale core. It contains all business logic as pure functions
//! with zero I/O dependencies.
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
//! │  │        tavola-db: registries, ledger, billing, kitchen view     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tavola-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │  statuses │  │  Totals   │  │  Domain   │  │   rules   │  │   │
//! │  │   │  entities │  │  TaxCalc  │  │  errors   │  │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Table, Order, OrderLine, Bill) and the
//!   status state machines
//! - [`money`] - Money type and order totals math (integer cents only)
//! - [`error`] - Domain error types with an [`error::ErrorKind`] retry policy
//! - [`validation`] - Field-level input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), never floats
//! 4. **One State Machine Per Entity**: transition validity is decided by
//!    the status enums, in exactly one place
//!
//! ## Example Usage
//!
//! ```rust
//! use tavola_core::money::Money;
//! use tavola_core::types::{LineStatus, TaxRate};
//!
//! // 5% dine-in tax on $25.00
//! let tax = Money::from_cents(2500).calculate_tax(TaxRate::from_bps(500));
//! assert_eq!(tax.cents(), 125);
//!
//! // Transition rules live on the enum
//! assert!(LineStatus::Pending.can_transition_to(LineStatus::Preparing));
//! assert!(!LineStatus::Cancelled.can_transition_to(LineStatus::Pending));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tavola_core::Money` instead of
// `use tavola_core::money::Money`

pub use error::{DomainError, DomainResult, ErrorKind, ValidationError};
pub use money::{compute_totals, final_bill_total, Money, Totals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default dine-in tax rate in basis points (5.00%).
///
/// ## Why a constant?
/// The rate is configurable per deployment through `DbConfig`; this is the
/// fallback used when nothing is configured, and the rate the scenario
/// tests are written against.
pub const DEFAULT_TAX_RATE_BPS: u32 = 500;

/// Maximum line-items allowed on a single order.
///
/// ## Business Reason
/// Prevents runaway orders; a dine-in party does not order 200 distinct
/// lines. Can be made configurable in future versions.
pub const MAX_ORDER_LINES: usize = 200;

/// Maximum quantity of a single line-item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 100 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 99;
