//! `PostgreSQL` adapter.
//!
//! Queries are built at runtime with `sqlx::query_as` and `QueryBuilder`, so
//! the crate compiles without a live database. Recipe list filters, ordering
//! and paging are pushed down into SQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use recipe_finder_core::{
    Email, Favorite, FavoriteId, NewRecipe, NewUser, Nutrition, Page, Recipe, RecipeId,
    RecipeQuery, RecipeUpdate, User, UserId,
};

use super::{FavoriteStore, Ping, RecipeStore, UserStore};
use crate::db::{RepositoryError, classify};

const RECIPE_COLUMNS: &str = "id, title, cuisine, ingredients, cook_time, servings, instructions, \
     calories, protein, carbs, fat, image_url, created_at, updated_at";

/// Store backed by the `users`, `recipes` and `favorites` tables.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct RecipeRow {
    id: RecipeId,
    title: String,
    cuisine: String,
    ingredients: Vec<String>,
    cook_time: i32,
    servings: i32,
    instructions: Option<String>,
    calories: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RecipeRow> for Recipe {
    fn from(r: RecipeRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            cuisine: r.cuisine,
            ingredients: r.ingredients,
            cook_time: r.cook_time,
            servings: r.servings,
            instructions: r.instructions,
            nutrition: Nutrition::from_parts(r.calories, r.protein, r.carbs, r.fat),
            image_url: r.image_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_parts(self) -> Result<(User, String), RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let user = User {
            id: self.id,
            name: self.name,
            email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        Ok((user, self.password_hash))
    }
}

#[derive(FromRow)]
struct FavoriteRow {
    id: FavoriteId,
    user_id: UserId,
    recipe_id: RecipeId,
    created_at: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(r: FavoriteRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            recipe_id: r.recipe_id,
            created_at: r.created_at,
        }
    }
}

/// Escape `LIKE` metacharacters so a search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Append the `WHERE` clause for `query`'s filters.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &RecipeQuery) {
    builder.push(" WHERE TRUE");

    if let Some(cuisine) = &query.cuisine {
        builder
            .push(" AND lower(cuisine) = lower(")
            .push_bind(cuisine.clone())
            .push(")");
    }

    if let Some(max_time) = query.max_time {
        builder.push(" AND cook_time <= ").push_bind(max_time);
    }

    if !query.ingredients.is_empty() {
        builder
            .push(
                " AND (SELECT array_agg(lower(btrim(i))) FROM unnest(ingredients) AS i) @> ",
            )
            .push_bind(query.ingredients.clone());
    }

    for term in &query.search_terms {
        let pattern = like_pattern(term);
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR EXISTS (SELECT 1 FROM unnest(ingredients) AS i WHERE i ILIKE ")
            .push_bind(pattern)
            .push("))");
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn list(&self, query: &RecipeQuery) -> Result<Page<Recipe>, RepositoryError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM recipes");
        push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes"));
        push_filters(&mut select, query);
        let direction = query.sort.direction.sql();
        select.push(format!(
            " ORDER BY {} {direction}, created_at {direction}, id {direction}",
            query.sort.key.column()
        ));
        select
            .push(" LIMIT ")
            .push_bind(i64::from(query.pagination.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.pagination.offset()).unwrap_or(i64::MAX));

        let rows: Vec<RecipeRow> = select
            .build_query_as::<RecipeRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(
            query.pagination,
            u64::try_from(total).unwrap_or_default(),
            rows.into_iter().map(Recipe::from).collect(),
        ))
    }

    async fn get(&self, id: RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        let row: Option<RecipeRow> = sqlx::query_as(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Recipe::from))
    }

    async fn get_many(&self, ids: &[RecipeId]) -> Result<Vec<Recipe>, RepositoryError> {
        let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, RepositoryError> {
        let recipe = recipe.into_recipe(Utc::now());
        let nutrition = recipe.nutrition.unwrap_or_default();

        let row: RecipeRow = sqlx::query_as(&format!(
            r"
            INSERT INTO recipes ({RECIPE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {RECIPE_COLUMNS}
            "
        ))
        .bind(recipe.id)
        .bind(&recipe.title)
        .bind(&recipe.cuisine)
        .bind(&recipe.ingredients)
        .bind(recipe.cook_time)
        .bind(recipe.servings)
        .bind(&recipe.instructions)
        .bind(nutrition.calories)
        .bind(nutrition.protein)
        .bind(nutrition.carbs)
        .bind(nutrition.fat)
        .bind(&recipe.image_url)
        .bind(recipe.created_at)
        .bind(recipe.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "recipe already exists"))?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: RecipeId,
        update: RecipeUpdate,
    ) -> Result<Option<Recipe>, RepositoryError> {
        let replace_nutrition = update.nutrition.is_some();
        let nutrition = update.nutrition.unwrap_or_default();

        let row: Option<RecipeRow> = sqlx::query_as(&format!(
            r"
            UPDATE recipes SET
                title = COALESCE($2, title),
                cuisine = COALESCE($3, cuisine),
                ingredients = COALESCE($4, ingredients),
                cook_time = COALESCE($5, cook_time),
                servings = COALESCE($6, servings),
                instructions = COALESCE($7, instructions),
                image_url = COALESCE($8, image_url),
                calories = CASE WHEN $9 THEN $10 ELSE calories END,
                protein = CASE WHEN $9 THEN $11 ELSE protein END,
                carbs = CASE WHEN $9 THEN $12 ELSE carbs END,
                fat = CASE WHEN $9 THEN $13 ELSE fat END,
                updated_at = $14
            WHERE id = $1
            RETURNING {RECIPE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(update.title)
        .bind(update.cuisine)
        .bind(update.ingredients)
        .bind(update.cook_time)
        .bind(update.servings)
        .bind(update.instructions)
        .bind(update.image_url)
        .bind(replace_nutrition)
        .bind(nutrition.calories)
        .bind(nutrition.protein)
        .bind(nutrition.carbs)
        .bind(nutrition.fat)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Recipe::from))
    }

    async fn delete(&self, id: RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        // favorites rows go with it through ON DELETE CASCADE
        let row: Option<RecipeRow> = sqlx::query_as(&format!(
            "DELETE FROM recipes WHERE id = $1 RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Recipe::from))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_parts().map(|(user, _)| user))
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE lower(email) = lower($1)
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_parts).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let (user, password_hash) = user.into_user(Utc::now());

        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, created_at, updated_at
            ",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "email already exists"))?;

        row.into_parts().map(|(user, _)| user)
    }
}

#[async_trait]
impl FavoriteStore for PgStore {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let rows: Vec<FavoriteRow> = sqlx::query_as(
            r"
            SELECT id, user_id, recipe_id, created_at
            FROM favorites
            WHERE user_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Favorite::from).collect())
    }

    async fn add(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
    ) -> Result<Favorite, RepositoryError> {
        let favorite = Favorite::new(user_id, recipe_id, Utc::now());

        let row: FavoriteRow = sqlx::query_as(
            r"
            INSERT INTO favorites (id, user_id, recipe_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, recipe_id, created_at
            ",
        )
        .bind(favorite.id)
        .bind(user_id)
        .bind(recipe_id)
        .bind(favorite.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "favorite already exists"))?;

        Ok(row.into())
    }

    async fn remove(
        &self,
        user_id: UserId,
        recipe_id: RecipeId,
    ) -> Result<Option<Favorite>, RepositoryError> {
        let row: Option<FavoriteRow> = sqlx::query_as(
            r"
            DELETE FROM favorites
            WHERE user_id = $1 AND recipe_id = $2
            RETURNING id, user_id, recipe_id, created_at
            ",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Favorite::from))
    }
}

#[async_trait]
impl Ping for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
