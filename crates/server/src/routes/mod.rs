//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Landing page (static index.html)
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (store reachable)
//!
//! # Users
//! GET  /get/users/                - All users
//! POST /add/user                  - Create a user
//! GET  /search/users/{keyword}    - Users whose name contains keyword
//!
//! # Items
//! GET  /get/items/                - All items
//! POST /add/item                  - Create an item in a user's listings
//! GET  /search/items/{keyword}    - Items whose description contains keyword
//! GET  /get/listings/{username}   - A user's listed items
//! GET  /get/purchases/{username}  - A user's purchased items
//! ```
//!
//! Trailing slashes are trimmed before routing, so `/get/users` and
//! `/get/users/` reach the same handler.

pub mod health;
pub mod items;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        // Users
        .route("/get/users", get(users::list))
        .route("/add/user", post(users::create))
        .route("/search/users/{keyword}", get(users::search))
        // Items
        .route("/get/items", get(items::list))
        .route("/add/item", post(items::create))
        .route("/search/items/{keyword}", get(items::search))
        .route("/get/listings/{username}", get(items::listings))
        .route("/get/purchases/{username}", get(items::purchases))
}
