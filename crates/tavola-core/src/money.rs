//! # Money Module
//!
//! The `Money` type and the totals math for orders and bills.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every monetary value is an i64 count of cents. Line totals and       │
//! │    subtotals are exact; only the tax step needs rounding, and it        │
//! │    rounds half-up exactly once, as the final step.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tavola_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line = price.multiply_quantity(2); // $21.98
//! assert_eq!(line.cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::types::{OrderLine, TaxRate};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts and adjustments can be negative intermediates
/// - **Single-field tuple struct**: zero-cost abstraction over i64
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Calculates tax, rounding half-up to the nearest cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 term is the
    /// half-up rounding (5000/10000 = 0.5); i128 prevents overflow on large
    /// amounts. Rounding happens here exactly once - never on intermediate
    /// sums.
    ///
    /// ## Example
    /// ```rust
    /// use tavola_core::money::Money;
    /// use tavola_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(2500); // $25.00
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(500)); // 5%
    /// assert_eq!(tax.cents(), 125); // $1.25
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Clamps the value to zero if negative.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }
}

/// Display implementation shows money in a human-readable format.
/// For debugging and log messages only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// Subtotal, tax, and total for an order, all in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Totals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl Totals {
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Computes subtotal, tax, and total over an order's line-items.
///
/// Cancelled lines are excluded. Subtotal is an exact integer sum of
/// unit price × quantity; tax rounds half-up as the final step; total is
/// their sum. An empty slice yields all zeroes.
///
/// Every call site that mutates lines (append, cancel, close) must persist
/// the result in the same logical step as the line mutation, so the cached
/// totals never drift from the line set.
pub fn compute_totals(lines: &[OrderLine], rate: TaxRate) -> Totals {
    let subtotal = lines
        .iter()
        .filter(|l| l.counts_towards_totals())
        .fold(Money::zero(), |acc, l| acc + l.line_total());

    let tax = subtotal.calculate_tax(rate);
    let total = subtotal + tax;

    Totals {
        subtotal_cents: subtotal.cents(),
        tax_cents: tax.cents(),
        total_cents: total.cents(),
    }
}

/// Final billed amount after discount: `max(0, total − discount)`.
///
/// The discount is validated non-negative before this is called; the clamp
/// guards the case where the discount exceeds the order total.
pub fn final_bill_total(order_total: Money, discount: Money) -> Money {
    (order_total - discount).clamp_non_negative()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineStatus;
    use chrono::Utc;

    fn line(price_cents: i64, qty: i64, status: LineStatus) -> OrderLine {
        let now = Utc::now();
        OrderLine {
            id: "line".to_string(),
            order_id: "order".to_string(),
            line_index: 0,
            menu_item_id: "item".to_string(),
            name_snapshot: "Test Item".to_string(),
            unit_price_cents: price_cents,
            quantity: qty,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);
        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // $10.00 at 8.25% = $0.825 → $0.83
        let tax = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.cents(), 83);

        // $1.01 at 5% = 5.05c → 5c
        let tax = Money::from_cents(101).calculate_tax(TaxRate::from_bps(500));
        assert_eq!(tax.cents(), 5);

        // $1.10 at 5% = 5.5c → 6c (half rounds up)
        let tax = Money::from_cents(110).calculate_tax(TaxRate::from_bps(500));
        assert_eq!(tax.cents(), 6);
    }

    /// Scenario: two lines (qty 2 @ $10.00, qty 1 @ $5.00) at 5% tax.
    #[test]
    fn test_totals_two_lines() {
        let lines = vec![
            line(1000, 2, LineStatus::Pending),
            line(500, 1, LineStatus::Pending),
        ];
        let totals = compute_totals(&lines, TaxRate::from_bps(500));
        assert_eq!(totals.subtotal_cents, 2500); // $25.00
        assert_eq!(totals.tax_cents, 125); // $1.25
        assert_eq!(totals.total_cents, 2625); // $26.25
    }

    /// Scenario: cancelling the $5.00 line drops it from the totals.
    #[test]
    fn test_totals_exclude_cancelled() {
        let lines = vec![
            line(1000, 2, LineStatus::Served),
            line(500, 1, LineStatus::Cancelled),
        ];
        let totals = compute_totals(&lines, TaxRate::from_bps(500));
        assert_eq!(totals.subtotal_cents, 2000); // $20.00
        assert_eq!(totals.tax_cents, 100); // $1.00
        assert_eq!(totals.total_cents, 2100); // $21.00
    }

    #[test]
    fn test_totals_empty() {
        let totals = compute_totals(&[], TaxRate::from_bps(500));
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn test_totals_invariant_total_is_subtotal_plus_tax() {
        for (price, qty) in [(999, 1), (333, 3), (1, 7), (12345, 2)] {
            let lines = vec![line(price, qty, LineStatus::Pending)];
            let t = compute_totals(&lines, TaxRate::from_bps(500));
            assert_eq!(t.total_cents, t.subtotal_cents + t.tax_cents);
        }
    }

    #[test]
    fn test_final_bill_total() {
        // $21.00 − $1.00 = $20.00
        let total = final_bill_total(Money::from_cents(2100), Money::from_cents(100));
        assert_eq!(total.cents(), 2000);

        // Discount larger than the total clamps to zero, never negative.
        let total = final_bill_total(Money::from_cents(500), Money::from_cents(900));
        assert_eq!(total.cents(), 0);

        // Zero discount is the identity.
        let total = final_bill_total(Money::from_cents(2100), Money::zero());
        assert_eq!(total.cents(), 2100);
    }
}
