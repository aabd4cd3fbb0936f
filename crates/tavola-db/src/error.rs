//! # Database and Service Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError = DomainError | DbError ← what service callers match on  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ErrorKind drives the retry policy (business outcome vs transient)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use tavola_core::{DomainError, ErrorKind};

// =============================================================================
// Database Error
// =============================================================================

/// Database operation errors.
///
/// These wrap sqlx errors and provide additional context. Transient
/// variants (pool/connection trouble) classify as `StorageUnavailable`
/// and are retryable by the caller with backoff; everything else is not.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate table number, second bill
    /// for the same order, ...).
    #[error("duplicate {field}: constraint violated")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (acquire timed out; all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True if this is a UNIQUE constraint violation on the given column.
    ///
    /// Used to translate storage-layer violations into precise domain
    /// errors (`DuplicateTableNumber`, `AlreadyBilled`).
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field } if field.contains(column))
    }

    /// Classifies this error for the caller's handling policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ErrorKind::PreconditionFailed
            }
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => ErrorKind::StorageUnavailable,
            DbError::MigrationFailed(_) | DbError::QueryFailed(_) | DbError::Internal(_) => {
                ErrorKind::StorageUnavailable
            }
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Service Error
// =============================================================================

/// What callers of the table/order/billing services see: either a business
/// outcome (domain error) or an infrastructure failure (db error).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl ServiceError {
    /// Classifies this error for the caller's handling policy.
    ///
    /// `NotFound`/`InvalidInput`/`PreconditionFailed` are reported with no
    /// retry; `Conflict` is safe to retry once after re-reading state;
    /// `StorageUnavailable` is retried with backoff and fails loudly when
    /// retries exhaust - never treated as silent success.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Domain(e) => e.kind(),
            ServiceError::Db(e) => e.kind(),
        }
    }

    /// True if the caller may retry this operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Conflict | ErrorKind::StorageUnavailable)
    }
}

impl From<tavola_core::ValidationError> for ServiceError {
    fn from(err: tavola_core::ValidationError) -> Self {
        ServiceError::Domain(DomainError::Validation(err))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_detection() {
        let err = DbError::UniqueViolation {
            field: "bills.order_id".to_string(),
        };
        assert!(err.is_unique_violation_on("order_id"));
        assert!(!err.is_unique_violation_on("table_number"));
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        let err: ServiceError = DbError::PoolExhausted.into();
        assert!(err.is_retryable());

        let err: ServiceError = DomainError::AlreadyBilled("o1".to_string()).into();
        assert!(!err.is_retryable());

        let err: ServiceError = DomainError::Conflict {
            entity: "order",
            id: "o1".to_string(),
        }
        .into();
        assert!(err.is_retryable());
    }
}
