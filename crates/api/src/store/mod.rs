//! Record stores for users, recipes and favorites.
//!
//! Each record kind has a capability trait. Two adapters implement all three:
//!
//! - [`MemoryStore`] - process-local collections behind a single async lock
//! - [`PgStore`] - durable `PostgreSQL` tables (see `migrations/`)
//!
//! Handlers only see the traits, through the [`Stores`] bundle held in
//! `AppState`. Lookups that find nothing return `Ok(None)`; uniqueness
//! violations surface as `RepositoryError::Conflict`.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use recipe_finder_core::{
    Email, Favorite, FavoriteWithRecipe, NewRecipe, NewUser, Page, Recipe, RecipeId, RecipeQuery,
    RecipeUpdate, User, UserId,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::db::RepositoryError;

/// Recipe persistence.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Filter, sort and paginate recipes.
    async fn list(&self, query: &RecipeQuery) -> Result<Page<Recipe>, RepositoryError>;

    async fn get(&self, id: RecipeId) -> Result<Option<Recipe>, RepositoryError>;

    /// Fetch several recipes at once; missing IDs are skipped.
    async fn get_many(&self, ids: &[RecipeId]) -> Result<Vec<Recipe>, RepositoryError>;

    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, RepositoryError>;

    /// Apply a partial update and return the updated record.
    async fn update(
        &self,
        id: RecipeId,
        update: RecipeUpdate,
    ) -> Result<Option<Recipe>, RepositoryError>;

    /// Delete a recipe and its favorites, returning the removed record.
    async fn delete(&self, id: RecipeId) -> Result<Option<Recipe>, RepositoryError>;
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look a user up by email (ignoring case), together with their password hash.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<(User, String)>, RepositoryError>;

    /// Store a new user.
    ///
    /// Fails with `RepositoryError::Conflict` if the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;
}

/// Favorite persistence.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// A user's favorites, oldest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError>;

    /// Record a favorite.
    ///
    /// Fails with `RepositoryError::Conflict` if the pair already exists and
    /// `RepositoryError::NotFound` if the recipe does not.
    async fn add(&self, user_id: UserId, recipe_id: RecipeId)
    -> Result<Favorite, RepositoryError>;

    /// Remove a favorite, returning the removed record.
    async fn remove(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
    ) -> Result<Option<Favorite>, RepositoryError>;
}

/// Health probe for the backing storage.
#[async_trait]
pub trait Ping: Send + Sync {
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// The store handles injected into application state.
#[derive(Clone)]
pub struct Stores {
    pub recipes: Arc<dyn RecipeStore>,
    pub users: Arc<dyn UserStore>,
    pub favorites: Arc<dyn FavoriteStore>,
    pub health: Arc<dyn Ping>,
}

impl Stores {
    /// Fresh, empty in-memory collections.
    #[must_use]
    pub fn memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }

    /// Tables in the given `PostgreSQL` database.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }

    fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: RecipeStore + UserStore + FavoriteStore + Ping + 'static,
    {
        Self {
            recipes: backend.clone(),
            users: backend.clone(),
            favorites: backend.clone(),
            health: backend,
        }
    }

    /// Join favorites with their recipes, preserving favorite order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the recipe lookup fails.
    pub async fn with_recipes(
        &self,
        favorites: Vec<Favorite>,
    ) -> Result<Vec<FavoriteWithRecipe>, RepositoryError> {
        let ids: Vec<RecipeId> = favorites.iter().map(|f| f.recipe_id).collect();
        let recipes = self.recipes.get_many(&ids).await?;

        Ok(favorites
            .into_iter()
            .map(|favorite| {
                let recipe = recipes
                    .iter()
                    .find(|r| r.id == favorite.recipe_id)
                    .cloned();
                FavoriteWithRecipe { favorite, recipe }
            })
            .collect())
    }
}
