//! Service layer error types
//!
//! The caller-facing error taxonomy. Ignored views are outcomes, not errors.

use blog_common::AppError;
use blog_core::DomainError;
use std::fmt;

/// Why a view was rejected as abusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspicionReason {
    /// Too many views from one IP inside the velocity window
    IpVelocity { count: i64, limit: i64 },
    /// One user seen from too many IPs inside the rotation window
    IpRotation { distinct_ips: i64, limit: i64 },
}

impl fmt::Display for SuspicionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IpVelocity { count, limit } => {
                write!(f, "ip velocity {count} exceeds limit {limit}")
            }
            Self::IpRotation { distinct_ips, limit } => {
                write!(f, "{distinct_ips} distinct ips exceed limit {limit}")
            }
        }
    }
}

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Missing identity or target
    InvalidArgument(String),

    /// Target does not exist
    NotFound { resource: &'static str, id: String },

    /// Velocity or rotation ceiling exceeded
    SuspiciousActivity(SuspicionReason),

    /// Underlying store failure
    Storage(DomainError),

    /// Caller deadline elapsed before the operation finished
    Timeout,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::SuspiciousActivity(reason) => write!(f, "Suspicious activity: {reason}"),
            Self::Storage(e) => write!(f, "Storage error: {e}"),
            Self::Timeout => write!(f, "Operation timed out"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Store failures may be retried with backoff; nothing else should be
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Timeout)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidArgument(_) => 400,
            Self::NotFound { .. } => 404,
            Self::SuspiciousActivity(_) => 429,
            Self::Storage(_) => 503,
            Self::Timeout => 504,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::SuspiciousActivity(SuspicionReason::IpVelocity { .. }) => "IP_VELOCITY_EXCEEDED",
            Self::SuspiciousActivity(SuspicionReason::IpRotation { .. }) => "IP_ROTATION_EXCEEDED",
            Self::Storage(e) => e.code(),
            Self::Timeout => "TIMEOUT",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ContentNotFound(id) => Self::not_found("Content", id),
            DomainError::ReactionNotFound(id) => Self::not_found("Reaction", id),
            DomainError::ValidationError(msg) => Self::InvalidArgument(msg),
            other => Self::Storage(other),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidArgument(msg) => AppError::InvalidInput(msg),
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::SuspiciousActivity(reason) => {
                AppError::SuspiciousActivity(reason.to_string())
            }
            ServiceError::Storage(e) => AppError::Domain(e),
            ServiceError::Timeout => AppError::Timeout,
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
