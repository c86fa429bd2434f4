//! Favorite records linking a user to a recipe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{FavoriteId, RecipeId, UserId};
use super::recipe::Recipe;

/// A user's bookmark of a recipe. At most one exists per `(user_id, recipe_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    #[serde(rename = "_id")]
    pub id: FavoriteId,
    pub user_id: UserId,
    pub recipe_id: RecipeId,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    /// Create a new favorite with a fresh ID.
    #[must_use]
    pub fn new(user_id: UserId, recipe_id: RecipeId, now: DateTime<Utc>) -> Self {
        Self {
            id: FavoriteId::generate(),
            user_id,
            recipe_id,
            created_at: now,
        }
    }
}

/// A favorite joined with its recipe, as returned by the favorites routes.
///
/// `recipe` is `None` only if the recipe disappeared between the two reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteWithRecipe {
    #[serde(flatten)]
    pub favorite: Favorite,
    pub recipe: Option<Recipe>,
}
