//! Recipe records and their create/update payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::RecipeId;

/// Optional nutrition facts attached to a recipe.
///
/// Every value is per serving and non-negative; missing values are omitted
/// from the JSON representation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

impl Nutrition {
    /// Build from individually stored columns; `None` when nothing is set.
    #[must_use]
    pub const fn from_parts(
        calories: Option<f64>,
        protein: Option<f64>,
        carbs: Option<f64>,
        fat: Option<f64>,
    ) -> Option<Self> {
        if calories.is_none() && protein.is_none() && carbs.is_none() && fat.is_none() {
            None
        } else {
            Some(Self {
                calories,
                protein,
                carbs,
                fat,
            })
        }
    }

    /// `None` when no value is set, so `{}` and an absent object agree.
    #[must_use]
    pub const fn non_empty(self) -> Option<Self> {
        Self::from_parts(self.calories, self.protein, self.carbs, self.fat)
    }
}

/// A stored recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: RecipeId,
    pub title: String,
    pub cuisine: String,
    pub ingredients: Vec<String>,
    /// Cooking time in minutes.
    pub cook_time: i32,
    pub servings: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Whether the recipe lists `ingredient`, ignoring case and surrounding space.
    #[must_use]
    pub fn has_ingredient(&self, ingredient: &str) -> bool {
        let wanted = ingredient.trim().to_lowercase();
        self.ingredients
            .iter()
            .any(|have| have.trim().to_lowercase() == wanted)
    }
}

/// Payload for creating a recipe.
///
/// Produced from a request body only after the create rule chain passed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub title: String,
    pub cuisine: String,
    pub ingredients: Vec<String>,
    pub cook_time: i32,
    pub servings: i32,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewRecipe {
    /// Materialize a stored record with a fresh ID and both timestamps at `now`.
    #[must_use]
    pub fn into_recipe(self, now: DateTime<Utc>) -> Recipe {
        Recipe {
            id: RecipeId::generate(),
            title: self.title,
            cuisine: self.cuisine,
            ingredients: self.ingredients,
            cook_time: self.cook_time,
            servings: self.servings,
            instructions: self.instructions,
            nutrition: self.nutrition.and_then(Nutrition::non_empty),
            image_url: self.image_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a recipe. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub cook_time: Option<i32>,
    #[serde(default)]
    pub servings: Option<i32>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl RecipeUpdate {
    /// Merge the present fields into `recipe`, keeping its ID and creation
    /// time and bumping `updated_at`.
    pub fn apply(self, recipe: &mut Recipe, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            recipe.title = title;
        }
        if let Some(cuisine) = self.cuisine {
            recipe.cuisine = cuisine;
        }
        if let Some(ingredients) = self.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(cook_time) = self.cook_time {
            recipe.cook_time = cook_time;
        }
        if let Some(servings) = self.servings {
            recipe.servings = servings;
        }
        if self.instructions.is_some() {
            recipe.instructions = self.instructions;
        }
        if let Some(nutrition) = self.nutrition {
            recipe.nutrition = nutrition.non_empty();
        }
        if self.image_url.is_some() {
            recipe.image_url = self.image_url;
        }
        recipe.updated_at = now;
    }
}
