//! Per-user favorites handlers.
//!
//! Every route is gated and only serves the caller's own favorites.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use recipe_finder_core::{
    Favorite, FavoriteWithRecipe, FieldRule, RuleSet, User, UserId, Validate,
};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::extract::{ValidJson, recipe_id};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Body of `POST /api/users/{userId}/favorites`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    pub recipe_id: String,
}

impl Validate for AddFavoriteRequest {
    fn rules() -> RuleSet {
        RuleSet::new(vec![
            FieldRule::body("recipeId")
                .is_string("Recipe ID must be a string")
                .not_empty("Recipe ID is required"),
        ])
    }
}

#[derive(Debug, Serialize)]
pub struct RemovedFavorite {
    pub message: &'static str,
    pub favorite: Favorite,
}

/// Reject callers acting on someone else's favorites.
fn ensure_owner(user: &User, path_user_id: &str, action: &str) -> Result<UserId> {
    match UserId::parse(path_user_id) {
        Ok(id) if id == user.id => Ok(id),
        _ => {
            tracing::warn!(
                caller = %user.id,
                target = path_user_id,
                "Favorites access denied"
            );
            Err(AppError::Forbidden(format!(
                "Forbidden: You can only {action} your own favorites"
            )))
        }
    }
}

/// List the caller's favorites with their recipes.
pub async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FavoriteWithRecipe>>> {
    let user_id = ensure_owner(&user, &user_id, "access")?;
    let favorites = state.favorites().list_for_user(user_id).await?;
    Ok(Json(state.stores().with_recipes(favorites).await?))
}

/// Favorite a recipe.
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ValidJson(body): ValidJson<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<FavoriteWithRecipe>)> {
    let user_id = ensure_owner(&user, &user_id, "add to")?;
    let recipe_id = recipe_id(&body.recipe_id)?;

    let favorite = state
        .favorites()
        .add(user_id, recipe_id)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::Conflict("Recipe already in favorites".to_owned())
            }
            RepositoryError::NotFound => AppError::NotFound("Recipe not found".to_owned()),
            other => AppError::Database(other),
        })?;

    let recipe = state.recipes().get(recipe_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(FavoriteWithRecipe { favorite, recipe }),
    ))
}

/// Remove a favorite.
pub async fn destroy(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path((user_id, recipe_id_raw)): Path<(String, String)>,
) -> Result<Json<RemovedFavorite>> {
    let user_id = ensure_owner(&user, &user_id, "remove from")?;
    let recipe_id = recipe_id(&recipe_id_raw)?;

    let favorite = state
        .favorites()
        .remove(user_id, recipe_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Favorite not found".to_owned()))?;

    Ok(Json(RemovedFavorite {
        message: "Favorite removed successfully",
        favorite,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use recipe_finder_core::Email;

    use super::*;

    fn user() -> User {
        User {
            id: UserId::generate(),
            name: "Owner".to_owned(),
            email: Email::parse("owner@example.com").unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_passes() {
        let user = user();
        assert_eq!(
            ensure_owner(&user, &user.id.to_string(), "access").unwrap(),
            user.id
        );
    }

    #[test]
    fn test_other_user_is_forbidden() {
        let err = ensure_owner(&user(), &UserId::generate().to_string(), "add to").unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.to_string(),
            "Forbidden: You can only add to your own favorites"
        );
    }

    #[test]
    fn test_garbage_user_id_is_forbidden() {
        let err = ensure_owner(&user(), "12345", "remove from").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_recipe_id_rules() {
        let rules = AddFavoriteRequest::rules();
        assert!(rules.check(&serde_json::json!({ "recipeId": "abc" })).is_ok());
        let errors = rules.check(&serde_json::json!({ "recipeId": 7 })).unwrap_err();
        assert_eq!(errors[0].message, "Recipe ID must be a string");
    }
}
