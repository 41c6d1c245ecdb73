//! Cache error types

use std::time::Duration;

use crate::pool::RedisPoolError;

/// Errors raised by cache stores.
///
/// These never reach callers of [`crate::CacheCoherence`]; they are logged
/// and swallowed there.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cache value could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<RedisPoolError> for CacheError {
    fn from(err: RedisPoolError) -> Self {
        match err {
            RedisPoolError::Serialization(e) => Self::Serialization(e),
            other => Self::Backend(other.to_string()),
        }
    }
}

/// Result type for cache store operations
pub type CacheResult<T> = Result<T, CacheError>;
