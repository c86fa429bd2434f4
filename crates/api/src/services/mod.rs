//! Business logic that sits between route handlers and the stores.

pub mod auth;

pub use auth::{AuthError, AuthService, TokenIssuer};
