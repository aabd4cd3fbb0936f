//! # Domain Types
//!
//! Core domain types for Tavola POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Table       │   │     Order       │   │      Bill       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  table_number   │   │  table_id (FK)  │   │  order_id (FK,  │       │
//! │  │  status         │   │  status         │   │    UNIQUE)      │       │
//! │  │  current_order  │   │  totals (cents) │   │  totals, method │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   TableStatus   │   │   OrderStatus   │   │   LineStatus    │       │
//! │  │  available      │   │  open           │   │  pending        │       │
//! │  │  occupied       │   │  closed         │   │  preparing      │       │
//! │  │  reserved       │   │  billed         │   │  served         │       │
//! │  │  cleaning       │   │  (forward only) │   │  cancelled      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Transition Rules Live Here
//! Every status set is a closed enum, and the validity of a transition is
//! decided by the enum itself (`can_transition_to`). Call sites never
//! re-derive these rules; they ask the type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000.
/// 500 bps = 5.00%, the default dine-in rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Table Status
// =============================================================================

/// Occupancy status of a dining table.
///
/// All four states are operator-reachable; the registry accepts any
/// transition requested by staff (a no-op transition is fine). The two
/// *guarded* moves are owned by the order/billing machinery:
/// - available → occupied happens only via `bind_order` (compare-and-set)
/// - occupied → available happens via `release` or an explicit status set,
///   both of which clear the bound order reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// Free for seating; may be bound to a new order.
    Available,
    /// Seated with exactly one open order.
    Occupied,
    /// Held for a future party.
    Reserved,
    /// Being bussed/cleaned after a party left.
    Cleaning,
}

impl TableStatus {
    /// Stable lowercase name, matching the database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
            TableStatus::Cleaning => "cleaning",
        }
    }
}

impl FromStr for TableStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(TableStatus::Available),
            "occupied" => Ok(TableStatus::Occupied),
            "reserved" => Ok(TableStatus::Reserved),
            "cleaning" => Ok(TableStatus::Cleaning),
            other => Err(ValidationError::NotAllowed {
                field: "table status".to_string(),
                value: other.to_string(),
                allowed: &["available", "occupied", "reserved", "cleaning"],
            }),
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for TableStatus {
    fn default() -> Self {
        TableStatus::Available
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle stage of an order: strictly forward, never backward.
///
/// ```text
/// open ──close──► closed ──finalize──► billed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepting line-item edits.
    Open,
    /// Locked pending payment; totals are frozen.
    Closed,
    /// Invoiced exactly once; terminal.
    Billed,
}

impl OrderStatus {
    /// Stable lowercase name, matching the database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Closed => "closed",
            OrderStatus::Billed => "billed",
        }
    }

    /// Whether `next` is a legal forward step from this status.
    ///
    /// Only two edges exist: open→closed and closed→billed. Everything
    /// else (including any backward move) is rejected, which is what makes
    /// the order walk monotonic.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Open, OrderStatus::Closed) | (OrderStatus::Closed, OrderStatus::Billed)
        )
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(OrderStatus::Open),
            "closed" => Ok(OrderStatus::Closed),
            "billed" => Ok(OrderStatus::Billed),
            other => Err(ValidationError::NotAllowed {
                field: "order status".to_string(),
                value: other.to_string(),
                allowed: &["open", "closed", "billed"],
            }),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Line Status
// =============================================================================

/// Kitchen-preparation status of a single line-item.
///
/// ```text
/// pending ──► preparing ──► served
///    │            │            │
///    └────────────┴────────────┴──► cancelled (terminal)
/// ```
///
/// Cancellation is deliberately lenient: it is reachable from every
/// non-cancelled state, including `served` (a served dish can still be
/// comped off the bill). A cancelled line stays in the sequence for audit
/// but is excluded from totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    /// Queued, not yet picked up by the kitchen.
    Pending,
    /// On the stove.
    Preparing,
    /// Delivered to the table.
    Served,
    /// Struck from the order; permanently excluded from totals.
    Cancelled,
}

impl LineStatus {
    /// Stable lowercase name, matching the database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineStatus::Pending => "pending",
            LineStatus::Preparing => "preparing",
            LineStatus::Served => "served",
            LineStatus::Cancelled => "cancelled",
        }
    }

    /// Position on the pending→preparing→served walk (cancelled has none).
    const fn rank(&self) -> Option<u8> {
        match self {
            LineStatus::Pending => Some(0),
            LineStatus::Preparing => Some(1),
            LineStatus::Served => Some(2),
            LineStatus::Cancelled => None,
        }
    }

    /// Whether `next` is a legal transition from this status.
    ///
    /// Rules, enforced here and nowhere else:
    /// - same status is always accepted (idempotent no-op)
    /// - cancelled is terminal
    /// - cancellation is allowed from any non-cancelled state
    /// - the preparation walk only moves forward (a served dish cannot
    ///   go back to preparing)
    pub fn can_transition_to(&self, next: LineStatus) -> bool {
        if *self == next {
            return true;
        }
        match (self.rank(), next.rank()) {
            // Already cancelled: terminal.
            (None, _) => false,
            // Cancelling a live line: always allowed.
            (Some(_), None) => true,
            // Forward-only on the preparation walk.
            (Some(from), Some(to)) => to > from,
        }
    }

    /// True for statuses the kitchen display cares about.
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, LineStatus::Pending | LineStatus::Preparing)
    }
}

impl FromStr for LineStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LineStatus::Pending),
            "preparing" => Ok(LineStatus::Preparing),
            "served" => Ok(LineStatus::Served),
            "cancelled" => Ok(LineStatus::Cancelled),
            other => Err(ValidationError::NotAllowed {
                field: "line status".to_string(),
                value: other.to_string(),
                allowed: &["pending", "preparing", "served", "cancelled"],
            }),
        }
    }
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            other => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                value: other.to_string(),
                allowed: &["cash", "card"],
            }),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settlement status of a bill. Refund handling is out of scope, so `paid`
/// is the only state a bill is ever written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
}

// =============================================================================
// Menu Item
// =============================================================================

/// A dish or drink on the menu catalog.
///
/// The catalog is a collaborator of the order machinery: `OrderLedger`
/// only ever reads `(id, name, price_cents, is_available)` and snapshots
/// name/price into the line-item at add-time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MenuItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on order lines and kitchen tickets.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Menu section, e.g. "Mains", "Drinks".
    pub category: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Whether the item can currently be ordered (soft availability toggle).
    pub is_available: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Table
// =============================================================================

/// A dining table.
///
/// ## Invariant
/// `current_order_id` is `Some` iff `status == Occupied` and the referenced
/// order is open. The registry clears it on every transition to Available.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Table {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-visible display number; unique across the floor.
    pub table_number: String,

    /// Seating capacity.
    pub capacity: i64,

    pub status: TableStatus,

    /// The open order currently bound to this table, if occupied.
    pub current_order_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// A dine-in order bound to a table.
///
/// Cached totals always reflect the non-cancelled line-items; every write
/// that mutates the line set recomputes them in the same transaction, so a
/// reader never observes lines without matching totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,

    /// Owning table.
    pub table_id: String,

    /// Denormalized display number, snapshotted when the order was opened.
    pub table_number: String,

    pub status: OrderStatus,

    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,

    /// Set exactly once, when the order transitions to billed.
    pub bill_id: Option<String>,

    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the cached total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// One menu item entry within an order.
///
/// ## Snapshot Pattern
/// Name and unit price are frozen at add-time; later catalog edits never
/// retroactively change an existing order.
///
/// ## Stable Addressing
/// Lines are append-only and addressed by `line_index`. They are never
/// reordered or removed, so an index handed to the kitchen stays valid for
/// the lifetime of the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,

    /// Zero-based position within the order; stable for the order's life.
    pub line_index: i64,

    /// Catalog reference (for reporting; display data is snapshotted below).
    pub menu_item_id: String,

    /// Name at add-time (frozen).
    pub name_snapshot: String,

    /// Unit price in cents at add-time (frozen).
    pub unit_price_cents: i64,

    /// Quantity ordered; always >= 1.
    pub quantity: i64,

    pub status: LineStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total before tax (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Whether this line counts towards order totals.
    #[inline]
    pub fn counts_towards_totals(&self) -> bool {
        self.status != LineStatus::Cancelled
    }
}

// =============================================================================
// Bill
// =============================================================================

/// The immutable financial record produced once per order at payment time.
///
/// A bill is never mutated or deleted through normal operation; the
/// database enforces at most one bill per order with a UNIQUE constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Bill {
    pub id: String,

    /// Source order; UNIQUE at the storage layer.
    pub order_id: String,

    /// Denormalized display number for the printed header.
    pub table_number: String,

    pub subtotal_cents: i64,
    pub tax_cents: i64,

    /// Tax rate applied, in basis points, recorded for audit.
    pub tax_rate_bps: i64,

    pub discount_cents: i64,

    /// Final amount due: max(0, order total − discount).
    pub total_cents: i64,

    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,

    pub billed_at: DateTime<Utc>,
}

/// Frozen copy of one non-cancelled order line at billing time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BillLine {
    pub id: String,
    pub bill_id: String,
    pub menu_item_id: String,
    pub name_snapshot: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
