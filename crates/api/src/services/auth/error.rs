//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown email.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration with an email that is already taken.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Bearer token is malformed, forged or expired.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Token is valid but its subject no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Token could not be signed.
    #[error("token issue error: {0}")]
    TokenIssue(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
