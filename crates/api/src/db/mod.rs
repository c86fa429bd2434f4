//! `PostgreSQL` connection handling.
//!
//! # Database: `recipe_finder`
//!
//! ## Tables
//!
//! - `users` - Registered accounts (argon2 hash, unique `lower(email)`)
//! - `recipes` - Recipe records with nutrition columns
//! - `favorites` - `(user_id, recipe_id)` bookmarks, unique per pair
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p recipe-finder-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Embedded schema migrations for the durable store.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Failures surfaced by the record stores.
///
/// Absent records are `Ok(None)`, not an error; `NotFound` is reserved for a
/// write that references something missing (favoriting an unknown recipe).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be turned back into a domain record.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    #[error("referenced record not found")]
    NotFound,

    /// A uniqueness rule was violated; holds what collided.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Map unique and foreign-key violations onto repository errors.
///
/// `conflict` names what was duplicated.
pub(crate) fn classify(err: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::Database(err)
}

/// Open the connection pool shared by the API and the CLI.
///
/// # Errors
///
/// Returns `sqlx::Error` if no connection can be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
