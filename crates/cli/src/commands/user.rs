//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli user create -e ada@example.com -n "Ada Lovelace" -p "correct horse"
//! ```

use bazaar_storefront::services::auth::{AuthError, AuthService};

use super::{CommandError, connect};

/// Errors from user commands.
#[derive(Debug, thiserror::Error)]
pub enum UserCommandError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a user with the same validation as registration.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserCommandError` for invalid input, a duplicate email or a
/// database failure.
pub async fn create(email: &str, name: &str, password: &str) -> Result<i32, UserCommandError> {
    let pool = connect().await?;

    let user = AuthService::new(&pool).register(name, email, password).await?;

    tracing::info!(user_id = %user.id, email = %user.email, "User created");
    Ok(user.id.as_i32())
}
