//! Store conformance: the same scenarios run against every adapter.
//!
//! The memory runs need nothing. The `PostgreSQL` runs are ignored by
//! default; point `RECIPES_DATABASE_URL` at a scratch database and run:
//!
//! ```bash
//! cargo test -p recipe-finder-integration-tests --test stores -- --ignored
//! ```
//!
//! Scenarios tag their rows with a fresh cuisine or email so they can share
//! one database and run in parallel.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use secrecy::SecretString;

use recipe_finder_api::db::{self, RepositoryError};
use recipe_finder_api::store::{FavoriteStore, RecipeStore, Stores, UserStore};
use recipe_finder_core::{
    Email, NewRecipe, NewUser, Nutrition, RecipeId, RecipeListParams, RecipeQuery, RecipeUpdate,
    User,
};

async fn postgres() -> Stores {
    let url = std::env::var("RECIPES_DATABASE_URL")
        .expect("RECIPES_DATABASE_URL must point at a scratch database");
    let pool = db::create_pool(&SecretString::from(url)).await.unwrap();
    db::MIGRATOR.run(&pool).await.unwrap();
    Stores::postgres(pool)
}

/// A cuisine no other scenario uses.
fn fresh_cuisine() -> String {
    format!("Cuisine {}", RecipeId::generate())
}

fn recipe(title: &str, cuisine: &str, cook_time: i32, ingredients: &[&str]) -> NewRecipe {
    NewRecipe {
        title: title.to_owned(),
        cuisine: cuisine.to_owned(),
        ingredients: ingredients.iter().map(|&i| i.to_owned()).collect(),
        cook_time,
        servings: 2,
        instructions: Some("Cook it.".to_owned()),
        nutrition: None,
        image_url: None,
    }
}

async fn user(stores: &Stores) -> User {
    let email = format!("cook.{}@example.com", RecipeId::generate());
    stores
        .users
        .create(NewUser {
            name: "Cook".to_owned(),
            email: Email::parse(&email).unwrap(),
            password_hash: "$argon2id$stub".to_owned(),
        })
        .await
        .unwrap()
}

fn query(cuisine: &str, extra: RecipeListParams) -> RecipeQuery {
    RecipeQuery::from(RecipeListParams {
        cuisine: Some(cuisine.to_owned()),
        ..extra
    })
}

async fn titles(stores: &Stores, query: &RecipeQuery) -> Vec<String> {
    let page = stores.recipes.list(query).await.unwrap();
    page.results.into_iter().map(|r| r.title).collect()
}

async fn recipe_crud(stores: &Stores) {
    let mut new = recipe("Ramen", &fresh_cuisine(), 30, &["noodles", "broth"]);
    new.nutrition = Some(Nutrition {
        calories: Some(550.0),
        ..Nutrition::default()
    });
    let created = stores.recipes.create(new).await.unwrap();

    let fetched = stores.recipes.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    let updated = stores
        .recipes
        .update(
            created.id,
            RecipeUpdate {
                servings: Some(4),
                ..RecipeUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.servings, 4);
    assert_eq!(updated.title, "Ramen");
    assert_eq!(updated.instructions.as_deref(), Some("Cook it."));
    assert_eq!(updated.nutrition, created.nutrition);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    // An empty nutrition object clears it on every adapter.
    let cleared = stores
        .recipes
        .update(
            created.id,
            RecipeUpdate {
                nutrition: Some(Nutrition::default()),
                ..RecipeUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.nutrition, None);

    let deleted = stores.recipes.delete(created.id).await.unwrap().unwrap();
    assert_eq!(deleted.id, created.id);
    assert!(stores.recipes.get(created.id).await.unwrap().is_none());
    assert!(stores.recipes.delete(created.id).await.unwrap().is_none());

    let missing = stores
        .recipes
        .update(RecipeId::generate(), RecipeUpdate::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

async fn list_paging(stores: &Stores) {
    let cuisine = fresh_cuisine();
    for n in 1..=12 {
        let ingredients: &[&str] = if n % 2 == 1 {
            &[" Garlic ", "salt", "oil"]
        } else {
            &["salt", "oil"]
        };
        stores
            .recipes
            .create(recipe(&format!("Dish {n:02}"), &cuisine, n * 5, ingredients))
            .await
            .unwrap();
    }

    let page = stores
        .recipes
        .list(&query(
            &cuisine.to_uppercase(),
            RecipeListParams {
                page: Some("2".to_owned()),
                limit: Some("5".to_owned()),
                sort_by: Some("title".to_owned()),
                ..RecipeListParams::default()
            },
        ))
        .await
        .unwrap();
    assert_eq!(page.total, 12);
    assert_eq!(page.total_pages, 3);
    let titles_on_page: Vec<_> = page.results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles_on_page,
        vec!["Dish 06", "Dish 07", "Dish 08", "Dish 09", "Dish 10"]
    );

    let quick = query(
        &cuisine,
        RecipeListParams {
            max_time: Some("20".to_owned()),
            sort_by: Some("-cookTime".to_owned()),
            ..RecipeListParams::default()
        },
    );
    assert_eq!(
        titles(stores, &quick).await,
        vec!["Dish 04", "Dish 03", "Dish 02", "Dish 01"]
    );

    let garlicky = query(
        &cuisine,
        RecipeListParams {
            ingredients: Some("garlic, SALT".to_owned()),
            sort_by: Some("title".to_owned()),
            ..RecipeListParams::default()
        },
    );
    assert_eq!(
        titles(stores, &garlicky).await,
        vec!["Dish 01", "Dish 03", "Dish 05", "Dish 07", "Dish 09", "Dish 11"]
    );

    let past_the_end = query(
        &cuisine,
        RecipeListParams {
            page: Some("9".to_owned()),
            ..RecipeListParams::default()
        },
    );
    let page = stores.recipes.list(&past_the_end).await.unwrap();
    assert_eq!(page.total, 12);
    assert!(page.results.is_empty());
}

async fn search_terms(stores: &Stores) {
    let cuisine = fresh_cuisine();
    for (title, ingredients) in [
        ("Half 50% Off Tart", &["flour", "butter"][..]),
        ("Plain 500 Tart", &["flour", "sugar"][..]),
        ("Green Curry", &["Thai basil", "coconut milk"][..]),
    ] {
        stores
            .recipes
            .create(recipe(title, &cuisine, 40, ingredients))
            .await
            .unwrap();
    }

    let search = |term: &str| {
        query(
            &cuisine,
            RecipeListParams {
                search: Some(term.to_owned()),
                sort_by: Some("title".to_owned()),
                ..RecipeListParams::default()
            },
        )
    };

    assert_eq!(titles(stores, &search("50%")).await, vec!["Half 50% Off Tart"]);
    assert_eq!(titles(stores, &search("BASIL")).await, vec!["Green Curry"]);
    assert_eq!(titles(stores, &search("tart off")).await, vec!["Half 50% Off Tart"]);
    assert_eq!(
        titles(stores, &search("tart")).await,
        vec!["Half 50% Off Tart", "Plain 500 Tart"]
    );
    assert!(titles(stores, &search("5_0")).await.is_empty());
}

async fn duplicate_email(stores: &Stores) {
    let first = user(stores).await;
    let shouted = Email::parse(&first.email.as_str().to_uppercase()).unwrap();

    let err = stores
        .users
        .create(NewUser {
            name: "Impostor".to_owned(),
            email: shouted.clone(),
            password_hash: "$argon2id$other".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)), "{err}");

    let (found, hash) = stores.users.find_by_email(&shouted).await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
    assert_eq!(hash, "$argon2id$stub");
    assert_eq!(stores.users.get(first.id).await.unwrap(), Some(first));
}

async fn favorites_lifecycle(stores: &Stores) {
    let cook = user(stores).await;
    let cuisine = fresh_cuisine();
    let soup = stores
        .recipes
        .create(recipe("Soup", &cuisine, 45, &["leek"]))
        .await
        .unwrap();
    let salad = stores
        .recipes
        .create(recipe("Salad", &cuisine, 10, &["lettuce"]))
        .await
        .unwrap();

    stores.favorites.add(cook.id, soup.id).await.unwrap();
    stores.favorites.add(cook.id, salad.id).await.unwrap();

    let err = stores.favorites.add(cook.id, soup.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)), "{err}");

    let err = stores
        .favorites
        .add(cook.id, RecipeId::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound), "{err}");

    let listed = stores.favorites.list_for_user(cook.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    let joined = stores.with_recipes(listed).await.unwrap();
    assert!(joined.iter().all(|f| f.recipe.is_some()));

    let removed = stores.favorites.remove(cook.id, salad.id).await.unwrap().unwrap();
    assert_eq!(removed.recipe_id, salad.id);
    assert!(stores.favorites.remove(cook.id, salad.id).await.unwrap().is_none());

    stores.recipes.delete(soup.id).await.unwrap();
    assert!(stores.favorites.list_for_user(cook.id).await.unwrap().is_empty());
}

macro_rules! conformance {
    ($($scenario:ident),* $(,)?) => {
        mod memory {
            $(
                #[tokio::test]
                async fn $scenario() {
                    super::$scenario(&super::Stores::memory()).await;
                }
            )*
        }

        mod postgres {
            $(
                #[tokio::test]
                #[ignore = "Requires PostgreSQL"]
                async fn $scenario() {
                    super::$scenario(&super::postgres().await).await;
                }
            )*
        }
    };
}

conformance!(
    recipe_crud,
    list_paging,
    search_terms,
    duplicate_email,
    favorites_lifecycle,
);
