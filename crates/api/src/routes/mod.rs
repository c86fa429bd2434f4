//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! # Health
//! GET    /api/health                                - Liveness
//! GET    /api/health/ready                          - Store readiness
//!
//! # Recipes
//! GET    /api/recipes                               - Filtered, paginated list
//! POST   /api/recipes                               - Create
//! GET    /api/recipes/{id}                          - Fetch one
//! PUT    /api/recipes/{id}                          - Partial update
//! DELETE /api/recipes/{id}                          - Delete (cascades to favorites)
//!
//! # Auth
//! POST   /api/auth/register                         - Create account, returns token
//! POST   /api/auth/login                            - Returns token
//! GET    /api/auth/me                               - Current user (requires auth)
//!
//! # Favorites (requires auth, own user only)
//! GET    /api/users/{userId}/favorites              - List with recipes
//! POST   /api/users/{userId}/favorites              - Add
//! DELETE /api/users/{userId}/favorites/{recipeId}   - Remove
//! ```

pub mod auth;
pub mod favorites;
pub mod health;
pub mod recipes;

use axum::{
    Router,
    http::{Method, StatusCode, Uri},
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the health routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create the recipe routes router.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(recipes::index).post(recipes::create))
        .route(
            "/{id}",
            get(recipes::show)
                .put(recipes::update)
                .delete(recipes::destroy),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

/// Create the favorites routes router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users/{user_id}/favorites",
            get(favorites::index).post(favorites::create),
        )
        .route(
            "/api/users/{user_id}/favorites/{recipe_id}",
            delete(favorites::destroy),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/health", health_routes())
        .nest("/api/recipes", recipe_routes())
        .nest("/api/auth", auth_routes())
        .merge(favorite_routes())
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
}

/// Catch-all for unmatched routes.
pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("404! {method} {} Not Found.", uri.path()),
    )
}
