//! Recipe CRUD handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;

use recipe_finder_core::{NewRecipe, Page, Recipe, RecipeListParams, RecipeQuery, RecipeUpdate};

use crate::error::{AppError, Result};
use crate::extract::{ValidJson, recipe_id};
use crate::state::AppState;

const RECIPE_NOT_FOUND: &str = "Recipe not found";

fn not_found() -> AppError {
    AppError::NotFound(RECIPE_NOT_FOUND.to_owned())
}

/// Body returned after a delete.
#[derive(Debug, Serialize)]
pub struct DeletedRecipe {
    pub message: &'static str,
    pub recipe: Recipe,
}

/// List recipes with filters, sorting and pagination.
///
/// Malformed numeric parameters fall back to their defaults instead of
/// failing the request.
#[tracing::instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<RecipeListParams>,
) -> Result<Json<Page<Recipe>>> {
    let query = RecipeQuery::from(params);
    let page = state.recipes().list(&query).await?;
    Ok(Json(page))
}

/// Fetch one recipe.
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Recipe>> {
    let id = recipe_id(&id)?;
    state
        .recipes()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Create a recipe.
pub async fn create(
    State(state): State<AppState>,
    ValidJson(recipe): ValidJson<NewRecipe>,
) -> Result<(StatusCode, Json<Recipe>)> {
    let recipe = state.recipes().create(recipe).await?;
    tracing::info!(recipe_id = %recipe.id, "Recipe created");
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// Partially update a recipe.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(update): ValidJson<RecipeUpdate>,
) -> Result<Json<Recipe>> {
    let id = recipe_id(&id)?;
    state
        .recipes()
        .update(id, update)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Delete a recipe and any favorites pointing at it.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedRecipe>> {
    let id = recipe_id(&id)?;
    let recipe = state.recipes().delete(id).await?.ok_or_else(not_found)?;
    tracing::info!(recipe_id = %recipe.id, "Recipe deleted");

    Ok(Json(DeletedRecipe {
        message: "Recipe deleted successfully",
        recipe,
    }))
}
