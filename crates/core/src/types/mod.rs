//! Core types for Recipe Finder.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! three record kinds owned by the stores.

pub mod email;
pub mod favorite;
pub mod id;
pub mod recipe;
pub mod user;

pub use email::{Email, EmailError};
pub use favorite::{Favorite, FavoriteWithRecipe};
pub use id::*;
pub use recipe::{NewRecipe, Nutrition, Recipe, RecipeUpdate};
pub use user::{NewUser, User};
