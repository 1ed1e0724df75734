//! Identity kept in the session cookie's server-side record.

use serde::{Deserialize, Serialize};

use bazaar_core::{Email, UserId, UserRole};

use super::user::User;

/// Snapshot of the logged-in account.
///
/// `role` is copied at login and rewritten when the account opens its first
/// shop, so handlers never need a users lookup to authorize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

pub mod keys {
    pub const CURRENT_USER: &str = "current_user";
}
