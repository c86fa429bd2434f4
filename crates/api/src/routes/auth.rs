//! Registration, login and current-user handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use recipe_finder_core::{Email, FieldError, FieldRule, RuleSet, User, Validate};

use crate::error::{AppError, Result};
use crate::extract::ValidJson;
use crate::middleware::RequireUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn rules() -> RuleSet {
        RuleSet::new(vec![
            FieldRule::body("name")
                .trim()
                .is_string("Name must be a string")
                .min_length(2, "Name must be at least 2 characters long")
                .not_empty("Name is required"),
            FieldRule::body("email")
                .is_email("Must be a valid email address")
                .not_empty("Email is required"),
            FieldRule::body("password")
                .is_string("Password must be a string")
                .min_length(6, "Password must be at least 6 characters long")
                .not_empty("Password is required"),
        ])
    }
}

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn rules() -> RuleSet {
        RuleSet::new(vec![
            FieldRule::body("email")
                .is_email("Must be a valid email address")
                .not_empty("Email is required"),
            FieldRule::body("password")
                .is_string("Password must be a string")
                .not_empty("Password is required"),
        ])
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

/// The rules already checked the address; this only converts it.
fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw).map_err(|_| {
        AppError::Validation(vec![FieldError {
            field: "email".to_owned(),
            message: "Must be a valid email address".to_owned(),
        }])
    })
}

/// Create an account and sign the caller in.
pub async fn register(
    State(state): State<AppState>,
    ValidJson(form): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let email = parse_email(&form.email)?;
    let session = AuthService::new(state.users(), state.tokens())
        .register(form.name, email, &form.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: session.user,
            token: session.token,
        }),
    ))
}

/// Exchange email and password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(form): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let email = parse_email(&form.email)?;
    let session = AuthService::new(state.users(), state.tokens())
        .login(&email, &form.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "Login rejected"))?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        token: session.token,
        user: session.user,
    }))
}

/// The user the bearer token belongs to.
pub async fn me(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}
