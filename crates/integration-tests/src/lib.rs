//! Integration tests for Recipe Finder.
//!
//! Each test spawns the full application (every middleware layer included)
//! on an ephemeral port with an in-memory store and talks to it over real
//! HTTP with `reqwest`. No database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p recipe-finder-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::{Client, Response, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use recipe_finder_api::{app, config::ApiConfig, state::AppState, store::Stores};

/// Signing secret used by every spawned server.
pub const TEST_JWT_SECRET: &str = "Zr8kQ2mX5vN9pL3wT7yB1cF6hJ4dG0sA";

/// A running server plus a client pointed at it.
///
/// The server stops when this is dropped.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

/// Errors from the harness itself, not from the API under test.
pub type HarnessResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

impl TestServer {
    /// Start the application on `127.0.0.1:0` with a fresh memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn() -> HarnessResult<Self> {
        let config = ApiConfig::for_memory(SecretString::from(TEST_JWT_SECRET));
        let listener = TcpListener::bind(config.socket_addr()).await?;
        let addr = listener.local_addr()?;
        let router = app(AppState::new(&config, Stores::memory()));

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = serve(listener, router, rx).await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a JSON body, optionally with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        token: Option<&str>,
    ) -> HarnessResult<Response> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// GET, optionally with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn get(&self, path: &str, token: Option<&str>) -> HarnessResult<Response> {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// DELETE, optionally with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> HarnessResult<Response> {
        let mut request = self.client.delete(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Create a recipe and return its JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API does not answer 201.
    pub async fn create_recipe(&self, body: &Value) -> HarnessResult<Value> {
        let response = self.post("/api/recipes", body, None).await?;
        expect_status(response, StatusCode::CREATED).await
    }

    /// Register an account and return `(user id, token)`.
    ///
    /// # Errors
    ///
    /// Returns an error if registration does not answer 201 with a user
    /// and token.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> HarnessResult<(String, String)> {
        let response = self
            .post(
                "/api/auth/register",
                &json!({ "name": name, "email": email, "password": password }),
                None,
            )
            .await?;
        let body = expect_status(response, StatusCode::CREATED).await?;

        let id = body["user"]["_id"].as_str().ok_or("missing user id")?;
        let token = body["token"].as_str().ok_or("missing token")?;
        Ok((id.to_owned(), token.to_owned()))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn serve(
    listener: TcpListener,
    router: axum::Router,
    shutdown: oneshot::Receiver<()>,
) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
        })
        .await
}

/// Check the status and decode the JSON body.
///
/// # Errors
///
/// Returns an error naming the actual status and body on mismatch.
pub async fn expect_status(response: Response, expected: StatusCode) -> HarnessResult<Value> {
    let status = response.status();
    let text = response.text().await?;
    if status != expected {
        return Err(format!("expected {expected}, got {status}: {text}").into());
    }
    Ok(serde_json::from_str(&text)?)
}

/// A valid recipe body with overridable title, cuisine and cook time.
#[must_use]
pub fn recipe_body(title: &str, cuisine: &str, cook_time: u32) -> Value {
    json!({
        "title": title,
        "cuisine": cuisine,
        "ingredients": ["salt", "olive oil", "garlic"],
        "cookTime": cook_time,
        "servings": 2,
        "instructions": "Mix and cook.",
    })
}
