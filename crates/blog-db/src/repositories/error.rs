//! Error handling utilities for repositories

use blog_core::error::DomainError;
use blog_core::value_objects::Snowflake;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

pub fn content_not_found(id: Snowflake) -> DomainError {
    DomainError::ContentNotFound(id)
}

pub fn reaction_not_found(id: Snowflake) -> DomainError {
    DomainError::ReactionNotFound(id)
}
