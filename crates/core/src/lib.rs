//! Recipe Finder Core - Shared domain library.
//!
//! This crate provides the types and pure logic used by every Recipe Finder
//! component:
//! - `api` - The HTTP/JSON service
//! - `cli` - Migration and seeding tools
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no I/O, no
//! database access, no HTTP. Both store adapters and the route handlers build
//! on the same filtering, pagination and validation code defined here.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, and the user/recipe/favorite records
//! - [`query`] - Recipe list parameters, filter predicate, sorting and pagination
//! - [`validation`] - Declarative per-field rule chains for request bodies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod query;
pub mod types;
pub mod validation;

pub use query::{Page, Pagination, RecipeListParams, RecipeQuery, SortDirection, SortKey};
pub use types::*;
pub use validation::{FieldError, FieldRule, RuleSet, Validate, ValidationError};
