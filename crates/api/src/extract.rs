//! Request extractors shared by the route handlers.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use recipe_finder_core::{RecipeId, Validate, ValidationError};

use crate::error::AppError;

/// JSON body that has passed its type's rule chain.
///
/// Malformed JSON and shape mismatches are rejected with 400 and a
/// `message`; rule failures with 400 and the full `errors` list.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        T::from_body(body).map(Self).map_err(|e| match e {
            ValidationError::Fields(errors) => AppError::Validation(errors),
            ValidationError::Malformed(message) => AppError::BadRequest(message),
        })
    }
}

/// Parse a recipe ID from a path segment.
///
/// # Errors
///
/// Returns `AppError::InvalidId` if the segment is not a UUID.
pub fn recipe_id(raw: &str) -> Result<RecipeId, AppError> {
    RecipeId::parse(raw).map_err(|_| AppError::InvalidId("recipe"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, header::CONTENT_TYPE};
    use recipe_finder_core::NewRecipe;

    use super::*;

    fn json_request(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let result = ValidJson::<NewRecipe>::from_request(json_request("{ not json"), &()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_rule_failures_are_collected() {
        let result = ValidJson::<NewRecipe>::from_request(json_request("{}"), &()).await;
        match result {
            Err(AppError::Validation(errors)) => assert!(errors.len() >= 5),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_recipe_id_parsing() {
        assert!(recipe_id("not-an-id").is_err());
        let id = RecipeId::generate();
        assert_eq!(recipe_id(&id.to_string()).unwrap(), id);
    }
}
