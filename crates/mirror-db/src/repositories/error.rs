//! Error handling utilities for repositories

use mirror_core::error::DomainError;
use mirror_core::value_objects::Snowflake;
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

/// Create a "conversation not found" error
pub fn conversation_not_found(id: Snowflake) -> DomainError {
    DomainError::ConversationNotFound(id)
}

/// Create a "mismatched mirror" error
pub fn mismatched_mirror(message_id: Snowflake, mirror_message_id: Snowflake) -> DomainError {
    DomainError::MismatchedMirror {
        message_id,
        mirror_message_id,
    }
}
