//! Error handling utilities for repositories

use matchpool_core::error::DomainError;
use matchpool_core::value_objects::Snowflake;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Create a "pool not found" error
pub fn pool_not_found(id: Snowflake) -> DomainError {
    DomainError::PoolNotFound(id)
}

/// Create a "pool member not found" error
pub fn pool_member_not_found(pool_id: Snowflake, member_id: Snowflake) -> DomainError {
    DomainError::PoolMemberNotFound { pool_id, member_id }
}
