//! Error types for the SENTRA system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentraError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    /// A required bootstrap invariant (e.g. a built-in role) is missing.
    /// Aborts startup instead of being swallowed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),
}

pub type SentraResult<T> = Result<T, SentraError>;
