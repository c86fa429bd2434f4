//! User domain types.
//!
//! [`User`] is the public profile: it never carries the password hash, so it
//! can be serialized straight into responses. Stores hand out the hash only
//! alongside the user, for login verification.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::email::Email;
use super::id::UserId;

/// A registered user (password excluded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email, unique ignoring case.
    pub email: Email,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
}

impl NewUser {
    /// Materialize a stored user with a fresh ID.
    #[must_use]
    pub fn into_user(self, now: DateTime<Utc>) -> (User, String) {
        let user = User {
            id: UserId::generate(),
            name: self.name,
            email: self.email,
            created_at: now,
            updated_at: now,
        };
        (user, self.password_hash)
    }
}
