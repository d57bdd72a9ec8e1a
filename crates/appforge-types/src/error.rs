//! Error enums shared across crates.

use thiserror::Error;

/// Errors from repository operations (trait definitions live in appforge-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from webhook signature verification.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing signature header")]
    MissingSignature,

    #[error("malformed signature header: {0}")]
    MalformedSignature(String),

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid signing secret: {0}")]
    InvalidKey(String),
}
