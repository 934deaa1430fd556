//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} `{key}`")]
    NotFound { entity_type: &'static str, key: String },

    #[error("Validation failed on {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Duplicate {field}: {message}")]
    Duplicate { field: &'static str, message: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, key: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity_type,
            key: key.into(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("Constraint violation on {field}: {message}")]
    Constraint { field: &'static str, message: String },

    /// The row is still referenced and protected from deletion.
    #[error("Entity is still referenced: {0}")]
    Protected(String),
}

impl RepoError {
    pub fn constraint(field: &'static str, message: impl Into<String>) -> Self {
        RepoError::Constraint {
            field,
            message: message.into(),
        }
    }
}
