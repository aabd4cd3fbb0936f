//! # Error Types
//!
//! Domain-specific error types for tavola-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tavola-core errors (this file)                                        │
//! │  ├── DomainError      - Business rule / precondition failures          │
//! │  └── ValidationError  - Malformed input                                 │
//! │                                                                         │
//! │  tavola-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - DomainError | DbError, what callers see        │
//! │                                                                         │
//! │  Every error carries an ErrorKind so callers apply one retry policy    │
//! │  instead of matching concrete variants.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every message names the entity and the violated precondition -
//!    these are expected operational occurrences, not bugs
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification driving the caller-side handling policy.
///
/// ```text
/// NotFound / InvalidInput / PreconditionFailed → report, never retry
/// Conflict           → safe to retry once after re-reading state
/// StorageUnavailable → retry with backoff; fail loudly if exhausted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Table / order / menu item / line index absent.
    NotFound,
    /// Malformed quantity, negative discount, unknown status value.
    InvalidInput,
    /// Entity exists but is in the wrong state for the operation.
    PreconditionFailed,
    /// A concurrent transition won the race; re-read and retry once.
    Conflict,
    /// Transient infrastructure failure; retryable with backoff.
    StorageUnavailable,
}

// =============================================================================
// Domain Error
// =============================================================================

/// Business rule violations surfaced by the table/order/billing machinery.
#[derive(Debug, Error)]
pub enum DomainError {
    // --- Tables -------------------------------------------------------------
    /// A table with this display number already exists.
    #[error("table number '{0}' already exists")]
    DuplicateTableNumber(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Deleting an occupied table is refused; bill or cancel the order first.
    #[error("table {table_number} is currently occupied and cannot be deleted")]
    TableOccupied { table_number: String },

    /// Opening an order requires an available table.
    #[error("table {table_number} is not available (status: {status})")]
    TableNotAvailable {
        table_number: String,
        status: String,
    },

    // --- Menu ---------------------------------------------------------------
    #[error("menu item not found: {0}")]
    MenuItemNotFound(String),

    /// The item exists but is toggled off the menu.
    #[error("menu item '{name}' is currently unavailable")]
    ItemUnavailable { name: String },

    // --- Orders -------------------------------------------------------------
    #[error("order not found: {0}")]
    OrderNotFound(String),

    /// The operation requires an open order.
    #[error("order {order_id} is {status}, not open")]
    OrderNotOpen { order_id: String, status: String },

    /// Billing requires a closed order.
    #[error("order {order_id} is {status}, not closed")]
    OrderNotClosed { order_id: String, status: String },

    /// Closing an order in which every line is cancelled is meaningless.
    #[error("order {0} has no active line-items to close")]
    NoActiveLineItems(String),

    #[error("order {order_id} has no line at index {index}")]
    OrderLineNotFound { order_id: String, index: i64 },

    /// The requested line transition is illegal (e.g. served → preparing).
    #[error("line {index} of order {order_id} cannot move from {from} to {to}")]
    InvalidLineTransition {
        order_id: String,
        index: i64,
        from: String,
        to: String,
    },

    // --- Billing ------------------------------------------------------------
    /// A bill already references this order; enforced definitively by the
    /// UNIQUE constraint on bills.order_id.
    #[error("order {0} has already been billed")]
    AlreadyBilled(String),

    #[error("discount cannot be negative (got {0} cents)")]
    InvalidDiscount(i64),

    // --- Concurrency --------------------------------------------------------
    /// A guarded update matched zero rows after a passing pre-read: some
    /// concurrent transition changed the state underneath us.
    #[error("{entity} {id} was modified concurrently; re-read and retry")]
    Conflict { entity: &'static str, id: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl DomainError {
    /// Classifies this error for the caller's handling policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::TableNotFound(_)
            | DomainError::MenuItemNotFound(_)
            | DomainError::OrderNotFound(_)
            | DomainError::OrderLineNotFound { .. } => ErrorKind::NotFound,

            DomainError::InvalidDiscount(_) | DomainError::Validation(_) => ErrorKind::InvalidInput,

            DomainError::DuplicateTableNumber(_)
            | DomainError::TableOccupied { .. }
            | DomainError::TableNotAvailable { .. }
            | DomainError::ItemUnavailable { .. }
            | DomainError::OrderNotOpen { .. }
            | DomainError::OrderNotClosed { .. }
            | DomainError::NoActiveLineItems(_)
            | DomainError::InvalidLineTransition { .. }
            | DomainError::AlreadyBilled(_) => ErrorKind::PreconditionFailed,

            DomainError::Conflict { .. } => ErrorKind::Conflict,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, used for early checks before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed closed set (unknown status string, etc.).
    #[error("{field} '{value}' must be one of: {allowed:?}")]
    NotAllowed {
        field: String,
        value: String,
        allowed: &'static [&'static str],
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with DomainError.
pub type DomainResult<T> = Result<T, DomainError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_entity_and_precondition() {
        let err = DomainError::TableNotAvailable {
            table_number: "12".to_string(),
            status: "occupied".to_string(),
        };
        assert_eq!(err.to_string(), "table 12 is not available (status: occupied)");

        let err = DomainError::AlreadyBilled("ord-1".to_string());
        assert_eq!(err.to_string(), "order ord-1 has already been billed");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            DomainError::OrderNotFound("x".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DomainError::AlreadyBilled("x".to_string()).kind(),
            ErrorKind::PreconditionFailed
        );
        assert_eq!(DomainError::InvalidDiscount(-5).kind(), ErrorKind::InvalidInput);
        assert_eq!(
            DomainError::Conflict {
                entity: "order",
                id: "x".to_string()
            }
            .kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_validation_converts_to_domain_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let domain_err: DomainError = validation_err.into();
        assert!(matches!(domain_err, DomainError::Validation(_)));
        assert_eq!(domain_err.kind(), ErrorKind::InvalidInput);
    }
}
