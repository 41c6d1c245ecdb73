//! Service layer error types
//!
//! Every failure a caller can see falls into one [`ErrorKind`]: bad input,
//! a conflict, a missing record, a failed write, or an internal fault.
//! Cache failures never appear here.

use mirror_common::AppError;
use mirror_core::DomainError;
use std::fmt;

/// Caller-facing failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected before any write
    Validation,
    /// Duplicate pair or mismatched mirror
    Conflict,
    NotFound,
    /// Store unavailable, timed out, or the atomic unit failed to commit
    WriteFailure,
    Internal,
}

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or repository failure
    Domain(DomainError),

    /// Validation error
    Validation(String),

    /// A required write did not finish within the deadline
    WriteTimeout(std::time::Duration),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::WriteTimeout(after) => write!(f, "Write timed out after {after:?}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the failure category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) if e.is_validation() => ErrorKind::Validation,
            Self::Domain(e) if e.is_conflict() => ErrorKind::Conflict,
            Self::Domain(e) if e.is_not_found() => ErrorKind::NotFound,
            Self::Domain(DomainError::DatabaseError(_)) => ErrorKind::WriteFailure,
            Self::Domain(_) => ErrorKind::Internal,
            Self::Validation(_) => ErrorKind::Validation,
            Self::WriteTimeout(_) => ErrorKind::WriteFailure,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::WriteFailure | ErrorKind::Internal => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(DomainError::DatabaseError(_)) | Self::WriteTimeout(_) => "WRITE_FAILURE",
            Self::Domain(e) => e.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(DomainError::DatabaseError(msg)) => AppError::WriteFailure(msg),
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::WriteTimeout(after) => {
                AppError::WriteFailure(format!("timed out after {after:?}"))
            }
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
