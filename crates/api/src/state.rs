//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::services::TokenIssuer;
use crate::store::{FavoriteStore, Ping, RecipeStore, Stores, UserStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the record stores and the token issuer built from the configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    stores: Stores,
    tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: &ApiConfig, stores: Stores) -> Self {
        let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                stores,
                tokens,
            }),
        }
    }

    /// The full store bundle.
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    #[must_use]
    pub fn recipes(&self) -> &dyn RecipeStore {
        self.inner.stores.recipes.as_ref()
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.stores.users.as_ref()
    }

    #[must_use]
    pub fn favorites(&self) -> &dyn FavoriteStore {
        self.inner.stores.favorites.as_ref()
    }

    #[must_use]
    pub fn health(&self) -> &dyn Ping {
        self.inner.stores.health.as_ref()
    }

    /// Bearer token issuer/verifier.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }
}
