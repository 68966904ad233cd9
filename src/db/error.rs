// Error types for store operations

use thiserror::Error;

/// Error types for database connection and query operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Error occurred during database connection attempt
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A row referenced by a write does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A guarded write found the row in a different stage than expected
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    /// A stored row violates the allocation lifecycle invariants
    #[error("Integrity violation: {0}")]
    Integrity(String),
}

impl From<sea_orm::DbErr> for DbError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::RecordNotFound(msg) => DbError::NotFound(msg),
            sea_orm::DbErr::Conn(e) => DbError::ConnectionError(e.to_string()),
            other => DbError::QueryError(other.to_string()),
        }
    }
}
