//! Seed the database from a JSON backup.
//!
//! The backup directory holds three arrays: `users.json`, `recipes.json`
//! and `favorites.json`. Every record carries its old `_id` (a plain string
//! or a `{"$oid": ...}` object); favorites refer to users and recipes by
//! those old IDs. New IDs are generated on insert and favorites are
//! re-pointed through the old-to-new maps. Favorites whose user or recipe
//! did not make it in are skipped.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use recipe_finder_api::db::{self, RepositoryError};
use recipe_finder_api::services::auth::hash_password;
use recipe_finder_api::store::Stores;
use recipe_finder_core::{Email, NewRecipe, NewUser, RecipeId, UserId, Validate};

/// Errors that abort seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("Failed to hash password for {0}")]
    PasswordHash(String),
}

#[derive(Debug, Deserialize)]
struct LegacyUser {
    #[serde(rename = "_id")]
    id: Value,
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyFavorite {
    user_id: Value,
    recipe_id: Value,
}

/// Parsed contents of a backup directory.
#[derive(Debug, Default)]
pub struct Backup {
    users: Vec<LegacyUser>,
    recipes: Vec<Value>,
    favorites: Vec<LegacyFavorite>,
}

/// What a seed run inserted and skipped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub recipes: usize,
    pub favorites: usize,
    pub skipped: usize,
}

/// Normalize a legacy `_id` to a map key.
fn legacy_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(legacy_key),
        _ => None,
    }
}

fn parse_array<T: serde::de::DeserializeOwned>(
    path: &str,
    json: &str,
) -> Result<Vec<T>, SeedError> {
    serde_json::from_str(json).map_err(|source| SeedError::Json {
        path: path.to_owned(),
        source,
    })
}

impl Backup {
    /// Parse the three backup arrays from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Json` naming the first file that fails to parse.
    pub fn from_json(users: &str, recipes: &str, favorites: &str) -> Result<Self, SeedError> {
        Ok(Self {
            users: parse_array("users.json", users)?,
            recipes: parse_array("recipes.json", recipes)?,
            favorites: parse_array("favorites.json", favorites)?,
        })
    }

    /// Read `users.json`, `recipes.json` and `favorites.json` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a file is missing or is not a JSON array of the
    /// expected shape.
    pub async fn load(dir: &Path) -> Result<Self, SeedError> {
        async fn read(dir: &Path, name: &str) -> Result<String, SeedError> {
            let path = dir.join(name);
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| SeedError::Read {
                    path: path.display().to_string(),
                    source,
                })
        }

        let users = read(dir, "users.json").await?;
        let recipes = read(dir, "recipes.json").await?;
        let favorites = read(dir, "favorites.json").await?;
        Self::from_json(&users, &recipes, &favorites)
    }
}

/// Insert a parsed backup through the record stores.
///
/// Invalid users and recipes are logged and skipped rather than failing the
/// whole run. Stored passwords that are already Argon2 hashes are kept;
/// anything else is treated as plaintext and hashed.
///
/// # Errors
///
/// Returns an error if a store operation fails for a reason other than a
/// duplicate record.
pub async fn seed_stores(stores: &Stores, backup: Backup) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    info!("Seeding users...");
    let mut user_map: HashMap<String, UserId> = HashMap::new();
    for legacy in backup.users {
        let Ok(email) = Email::parse(&legacy.email) else {
            warn!(email = %legacy.email, "Skipping user with invalid email");
            report.skipped += 1;
            continue;
        };
        let password_hash = if legacy.password.starts_with("$argon2") {
            legacy.password
        } else {
            hash_password(&legacy.password)
                .map_err(|_| SeedError::PasswordHash(email.to_string()))?
        };

        let created = stores
            .users
            .create(NewUser {
                name: legacy.name,
                email,
                password_hash,
            })
            .await;
        match created {
            Ok(user) => {
                info!(email = %user.email, "Created user");
                if let Some(key) = legacy_key(&legacy.id) {
                    user_map.insert(key, user.id);
                }
                report.users += 1;
            }
            Err(RepositoryError::Conflict(_)) => {
                warn!(email = %legacy.email, "Skipping duplicate user");
                report.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeding recipes...");
    let mut recipe_map: HashMap<String, RecipeId> = HashMap::new();
    for body in backup.recipes {
        let old_key = body.get("_id").and_then(legacy_key);
        let recipe = match NewRecipe::from_body(body) {
            Ok(recipe) => recipe,
            Err(e) => {
                warn!(error = %e, "Skipping invalid recipe");
                report.skipped += 1;
                continue;
            }
        };

        let recipe = stores.recipes.create(recipe).await?;
        info!(title = %recipe.title, "Created recipe");
        if let Some(key) = old_key {
            recipe_map.insert(key, recipe.id);
        }
        report.recipes += 1;
    }

    info!("Seeding favorites...");
    for legacy in backup.favorites {
        let user_id = legacy_key(&legacy.user_id).and_then(|k| user_map.get(&k).copied());
        let recipe_id = legacy_key(&legacy.recipe_id).and_then(|k| recipe_map.get(&k).copied());

        let (Some(user_id), Some(recipe_id)) = (user_id, recipe_id) else {
            warn!("Skipping favorite: user or recipe not found");
            report.skipped += 1;
            continue;
        };

        match stores.favorites.add(user_id, recipe_id).await {
            Ok(_) => {
                info!(%user_id, %recipe_id, "Created favorite");
                report.favorites += 1;
            }
            Err(RepositoryError::Conflict(_)) => {
                warn!(%user_id, %recipe_id, "Skipping duplicate favorite");
                report.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}

/// Seed the configured database from `dir`.
///
/// # Arguments
///
/// * `dir` - Directory holding the backup JSON files
/// * `keep_existing` - If false, all tables are emptied first
///
/// # Errors
///
/// Returns an error if the backup cannot be read, the database URL is
/// missing, or a database operation fails.
pub async fn run(dir: &Path, keep_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    // Read the backup before touching the database
    info!(path = %dir.display(), "Loading backup");
    let backup = Backup::load(dir).await?;
    info!(
        users = backup.users.len(),
        recipes = backup.recipes.len(),
        favorites = backup.favorites.len(),
        "Parsed backup"
    );

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    if !keep_existing {
        info!("Clearing existing data...");
        sqlx::query("TRUNCATE favorites, recipes, users")
            .execute(&pool)
            .await
            .map_err(SeedError::from)?;
    }

    let report = seed_stores(&Stores::postgres(pool), backup).await?;

    info!(
        users = report.users,
        recipes = report.recipes,
        favorites = report.favorites,
        skipped = report.skipped,
        "Database seeded successfully"
    );
    Ok(())
}
