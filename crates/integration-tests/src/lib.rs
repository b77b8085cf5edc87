//! Integration tests for the Ostaa marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ostaa-integration-tests
//!
//! # Include the PostgreSQL store tests
//! MARKET_TEST_DATABASE_URL=postgres://localhost/ostaa_test cargo test -p ostaa-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_*` - HTTP round trips through the full router over the in-memory store
//! - `api_store_errors` - Every route over a [`FailingStore`]
//! - `postgres_store` - `PgMarketStore` against a real database (opt-in)
//!
//! [`TestApp`] drives the router in-process with `tower::ServiceExt::oneshot`,
//! so no port is bound.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, StatusCode, header},
};
use ostaa_core::{Item, KeywordPattern, NewItem, NewUser, SearchMode, User};
use ostaa_server::db::{MarketStore, MemoryStore, RepositoryError};
use ostaa_server::services::MarketService;
use ostaa_server::state::AppState;
use serde::de::DeserializeOwned;
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;

/// Directory holding the server's shipped `index.html`.
#[must_use]
pub fn public_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../server/public_html")
}

/// A response collected into memory.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl TestResponse {
    /// Body as UTF-8 text.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("response body is not UTF-8")
    }

    /// Body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON for `T`.
    #[must_use]
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("response body is not the expected JSON")
    }
}

/// The full application over a fresh in-memory store.
pub struct TestApp {
    app: NormalizePath<Router>,
    market: MarketService,
}

impl TestApp {
    /// Build an app with literal keyword search.
    #[must_use]
    pub fn new() -> Self {
        Self::with_search_mode(SearchMode::Literal)
    }

    /// Build an app with the given keyword search mode.
    #[must_use]
    pub fn with_search_mode(mode: SearchMode) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), mode)
    }

    /// Build an app over an arbitrary store.
    #[must_use]
    pub fn with_store(store: Arc<dyn MarketStore>, mode: SearchMode) -> Self {
        let market = MarketService::new(store, mode);
        let state = AppState::new(market.clone(), public_dir());
        Self {
            app: ostaa_server::app::build(state),
            market,
        }
    }

    /// Direct access to the Data Access Layer behind the app.
    #[must_use]
    pub const fn market(&self) -> &MarketService {
        &self.market
    }

    /// Send a request and collect the response.
    ///
    /// # Panics
    ///
    /// Panics if the service or body collection fails.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");

        TestResponse {
            status,
            content_type,
            body,
        }
    }

    /// `GET uri`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    /// `POST uri` with a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn post_json(&self, uri: &str, body: &serde_json::Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    /// `POST uri` with a url-encoded form body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn post_form(&self, uri: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .expect("valid request");
        self.send(request).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A store whose every operation fails, for exercising error responses.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingStore;

impl FailingStore {
    fn fail<T>() -> Result<T, RepositoryError> {
        Err(RepositoryError::InvalidPattern("store unavailable".to_string()))
    }
}

#[async_trait]
impl MarketStore for FailingStore {
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Self::fail()
    }

    async fn list_items(&self) -> Result<Vec<Item>, RepositoryError> {
        Self::fail()
    }

    async fn insert_user(&self, _user: NewUser) -> Result<User, RepositoryError> {
        Self::fail()
    }

    async fn insert_item(&self, _item: NewItem) -> Result<Item, RepositoryError> {
        Self::fail()
    }

    async fn find_user(&self, _username: &str) -> Result<Option<User>, RepositoryError> {
        Self::fail()
    }

    async fn add_listing(
        &self,
        _username: &str,
        _item: NewItem,
    ) -> Result<Option<Item>, RepositoryError> {
        Self::fail()
    }

    async fn search_users(&self, _pattern: &KeywordPattern) -> Result<Vec<User>, RepositoryError> {
        Self::fail()
    }

    async fn search_items(&self, _pattern: &KeywordPattern) -> Result<Vec<Item>, RepositoryError> {
        Self::fail()
    }

    async fn listings(&self, _username: &str) -> Result<Option<Vec<Item>>, RepositoryError> {
        Self::fail()
    }

    async fn purchases(&self, _username: &str) -> Result<Option<Vec<Item>>, RepositoryError> {
        Self::fail()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Self::fail()
    }
}
