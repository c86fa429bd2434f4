//! In-memory adapter.
//!
//! All three collections sit behind one `RwLock`, so a mutation and any
//! uniqueness check it depends on happen atomically.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use recipe_finder_core::{
    Email, Favorite, NewRecipe, NewUser, Page, Recipe, RecipeId, RecipeQuery, RecipeUpdate, User,
    UserId,
};

use super::{FavoriteStore, Ping, RecipeStore, UserStore};
use crate::db::RepositoryError;

#[derive(Default)]
struct Collections {
    users: HashMap<UserId, (User, String)>,
    recipes: HashMap<RecipeId, Recipe>,
    favorites: Vec<Favorite>,
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn list(&self, query: &RecipeQuery) -> Result<Page<Recipe>, RepositoryError> {
        let data = self.data.read().await;
        Ok(query.apply(data.recipes.values().cloned()))
    }

    async fn get(&self, id: RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        Ok(self.data.read().await.recipes.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[RecipeId]) -> Result<Vec<Recipe>, RepositoryError> {
        let data = self.data.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| data.recipes.get(id).cloned())
            .collect())
    }

    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, RepositoryError> {
        let recipe = recipe.into_recipe(Utc::now());
        self.data
            .write()
            .await
            .recipes
            .insert(recipe.id, recipe.clone());
        Ok(recipe)
    }

    async fn update(
        &self,
        id: RecipeId,
        update: RecipeUpdate,
    ) -> Result<Option<Recipe>, RepositoryError> {
        let mut data = self.data.write().await;
        let Some(recipe) = data.recipes.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(recipe, Utc::now());
        Ok(Some(recipe.clone()))
    }

    async fn delete(&self, id: RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        let mut data = self.data.write().await;
        let removed = data.recipes.remove(&id);
        if removed.is_some() {
            data.favorites.retain(|f| f.recipe_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .data
            .read()
            .await
            .users
            .get(&id)
            .map(|(user, _)| user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .data
            .read()
            .await
            .users
            .values()
            .find(|(user, _)| user.email.matches(email))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut data = self.data.write().await;
        if data.users.values().any(|(u, _)| u.email.matches(&user.email)) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let (user, password_hash) = user.into_user(Utc::now());
        data.users.insert(user.id, (user.clone(), password_hash));
        Ok(user)
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        Ok(self
            .data
            .read()
            .await
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
    ) -> Result<Favorite, RepositoryError> {
        let mut data = self.data.write().await;
        if !data.recipes.contains_key(&recipe_id) {
            return Err(RepositoryError::NotFound);
        }
        if data
            .favorites
            .iter()
            .any(|f| f.user_id == user_id && f.recipe_id == recipe_id)
        {
            return Err(RepositoryError::Conflict("favorite already exists".to_owned()));
        }

        let favorite = Favorite::new(user_id, recipe_id, Utc::now());
        data.favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn remove(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
    ) -> Result<Option<Favorite>, RepositoryError> {
        let mut data = self.data.write().await;
        let position = data
            .favorites
            .iter()
            .position(|f| f.user_id == user_id && f.recipe_id == recipe_id);
        Ok(position.map(|i| data.favorites.remove(i)))
    }
}

#[async_trait]
impl Ping for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
