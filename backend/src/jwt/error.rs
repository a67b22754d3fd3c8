//! JWT-related error types

use thiserror::Error;

/// Errors that can occur during JWT operations
#[derive(Error, Debug)]
pub enum JwtError {
    /// Verification key could not be parsed
    #[error("Failed to load JWT verification key: {0}")]
    KeyLoadError(#[source] jsonwebtoken::errors::Error),

    /// No verification key is configured for this environment
    #[error("No JWT verification key configured")]
    MissingKey,

    /// JWT validation failed
    #[error("Invalid or expired token")]
    ValidationError(#[from] jsonwebtoken::errors::Error),
}
