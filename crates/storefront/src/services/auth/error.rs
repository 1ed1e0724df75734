//! Failures from registration and login.

use thiserror::Error;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bazaar_core::EmailError),

    /// Unknown email or wrong password. The two are never told apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    UserAlreadyExists,

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("password rejected: {0}")]
    WeakPassword(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// argon2 failed to hash or parse a stored hash.
    #[error("password hashing failed")]
    PasswordHash,
}
