//! Recipe CRUD and listing over HTTP.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use recipe_finder_integration_tests::{TestServer, expect_status, recipe_body};

fn titles(page: &Value) -> Vec<String> {
    page["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::spawn().await.unwrap();
    let body = expect_status(server.get("/api/health", None).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["service"], "recipe-finder");
}

#[tokio::test]
async fn test_created_recipe_is_retrievable() {
    let server = TestServer::spawn().await.unwrap();
    let mut body = recipe_body("Shakshuka", "Middle Eastern", 30);
    body["nutrition"] = json!({ "calories": 410, "protein": 21.5 });
    body["imageUrl"] = json!("https://img.example.com/shakshuka.jpg");

    let created = server.create_recipe(&body).await.unwrap();
    let id = created["_id"].as_str().unwrap();

    let fetched = expect_status(
        server.get(&format!("/api/recipes/{id}"), None).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched["title"], "Shakshuka");
    assert_eq!(fetched["cookTime"], 30);
    assert_eq!(fetched["nutrition"]["protein"], 21.5);
}

#[tokio::test]
async fn test_create_rejects_invalid_body_with_all_messages() {
    let server = TestServer::spawn().await.unwrap();
    let response = server
        .post(
            "/api/recipes",
            &json!({ "title": "", "ingredients": [], "cookTime": -1 }),
            None,
        )
        .await
        .unwrap();
    let body = expect_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let messages: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert!(messages.contains(&"Title is required"));
    assert!(messages.contains(&"Cuisine is required"));
    assert!(messages.contains(&"Ingredients must be a non-empty array"));
    assert!(messages.contains(&"Cook time must be a positive number"));
    assert!(messages.contains(&"Servings is required"));
}

#[tokio::test]
async fn test_update_is_partial() {
    let server = TestServer::spawn().await.unwrap();
    let created = server
        .create_recipe(&recipe_body("Risotto", "Italian", 40))
        .await
        .unwrap();
    let id = created["_id"].as_str().unwrap();

    let response = server
        .client
        .put(server.url(&format!("/api/recipes/{id}")))
        .json(&json!({ "cookTime": 35 }))
        .send()
        .await
        .unwrap();
    let updated = expect_status(response, StatusCode::OK).await.unwrap();
    assert_eq!(updated["cookTime"], 35);
    assert_eq!(updated["title"], "Risotto");
    assert_eq!(updated["ingredients"], created["ingredients"]);
}

#[tokio::test]
async fn test_deleted_recipe_is_gone() {
    let server = TestServer::spawn().await.unwrap();
    let created = server
        .create_recipe(&recipe_body("Gazpacho", "Spanish", 15))
        .await
        .unwrap();
    let path = format!("/api/recipes/{}", created["_id"].as_str().unwrap());

    let deleted = expect_status(server.delete(&path, None).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(deleted["message"], "Recipe deleted successfully");
    assert_eq!(deleted["recipe"]["title"], "Gazpacho");

    let response = server.get(&path, None).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = server.delete(&path, None).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_400() {
    let server = TestServer::spawn().await.unwrap();
    let response = server.get("/api/recipes/not-an-id", None).await.unwrap();
    let body = expect_status(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["message"], "Invalid recipe ID format");
}

#[tokio::test]
async fn test_cuisine_and_max_time_filters() {
    let server = TestServer::spawn().await.unwrap();
    for (title, cuisine, time) in [
        ("Carbonara", "italian", 20),
        ("Lasagna", "ITALIAN", 21),
        ("Pho", "Vietnamese", 20),
        ("Bruschetta", "Italian", 10),
    ] {
        server
            .create_recipe(&recipe_body(title, cuisine, time))
            .await
            .unwrap();
    }

    let page = expect_status(
        server
            .get("/api/recipes?cuisine=Italian&maxTime=20&sortBy=title", None)
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(page["total"], 2);
    assert_eq!(titles(&page), vec!["Bruschetta", "Carbonara"]);
}

#[tokio::test]
async fn test_ingredient_filter_requires_all() {
    let server = TestServer::spawn().await.unwrap();
    let mut body = recipe_body("Caprese", "Italian", 5);
    body["ingredients"] = json!(["Tomato", "Mozzarella", "Basil"]);
    server.create_recipe(&body).await.unwrap();
    body["title"] = json!("Tomato Soup");
    body["ingredients"] = json!(["tomato", "cream"]);
    server.create_recipe(&body).await.unwrap();

    let page = expect_status(
        server
            .get("/api/recipes?ingredients=%20tomato%20,BASIL", None)
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(titles(&page), vec!["Caprese"]);
}

#[tokio::test]
async fn test_second_page_of_twelve() {
    let server = TestServer::spawn().await.unwrap();
    for n in 1..=12 {
        server
            .create_recipe(&recipe_body(&format!("Dish {n:02}"), "Fusion", 10))
            .await
            .unwrap();
    }

    let page = expect_status(
        server
            .get("/api/recipes?page=2&limit=5&sortBy=title", None)
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(page["page"], 2);
    assert_eq!(page["limit"], 5);
    assert_eq!(page["total"], 12);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(
        titles(&page),
        vec!["Dish 06", "Dish 07", "Dish 08", "Dish 09", "Dish 10"]
    );
}

#[tokio::test]
async fn test_bad_paging_falls_back_to_defaults() {
    let server = TestServer::spawn().await.unwrap();
    let page = expect_status(
        server
            .get("/api/recipes?page=abc&limit=-3", None)
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(page["page"], 1);
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn test_unknown_route_is_plain_text_404() {
    let server = TestServer::spawn().await.unwrap();
    let response = server.get("/api/nowhere", None).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.text().await.unwrap(),
        "404! GET /api/nowhere Not Found."
    );
}
