//! Error types shared by the storage layers
//!
//! `DatabaseError` is what every PostgreSQL-backed store surfaces. Constraint
//! violations are split out so stores can turn them into domain errors
//! (duplicate participation, taken username) instead of generic failures.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign key constraint rejected the write
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify an error returned by a query
    pub fn from_query(err: SqlxError) -> Self {
        if let SqlxError::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            if db_err.is_unique_violation() {
                return DatabaseError::UniqueViolation { constraint };
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::ForeignKeyViolation { constraint };
            }
        }

        match err {
            SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
                DatabaseError::Connection(err)
            }
            other => DatabaseError::Query(other),
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_connection_errors() {
        assert!(matches!(
            DatabaseError::from_query(SqlxError::PoolTimedOut),
            DatabaseError::Connection(_)
        ));
    }

    #[test]
    fn test_other_errors_are_query_errors() {
        assert!(matches!(
            DatabaseError::from_query(SqlxError::RowNotFound),
            DatabaseError::Query(_)
        ));
    }
}
