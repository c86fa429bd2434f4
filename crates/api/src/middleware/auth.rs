//! Bearer-token auth gate.
//!
//! [`RequireUser`] resolves `Authorization: Bearer <token>` to a stored user
//! or rejects the request with 401.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use recipe_finder_core::User;

use crate::error::{AppError, set_sentry_user};
use crate::services::AuthService;
use crate::state::AppState;

const MISSING_TOKEN: &str =
    "Access denied. No token provided or invalid format. Use 'Bearer <token>'";

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
#[derive(Debug)]
pub struct RequireUser(pub User);

/// Pull the token out of an `Authorization` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme == "Bearer" && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| AppError::Unauthorized(MISSING_TOKEN.to_owned()))?;

        let user = AuthService::new(state.users(), state.tokens())
            .authenticate(token)
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "Bearer token rejected"))?;

        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(user))
    }
}
