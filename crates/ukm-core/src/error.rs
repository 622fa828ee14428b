//! Error types for the UKM system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UkmError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Identity service error: {0}")]
    Identity(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UkmResult<T> = Result<T, UkmError>;
