//! Document store access.
//!
//! The marketplace keeps two collections, `users` and `items`. A user's
//! `listings` and `purchases` hold item ids. [`MarketStore`] is the seam
//! between the Data Access Layer and whichever store backs it:
//!
//! - [`postgres::PgMarketStore`] - `PostgreSQL` (`market.users`, `market.items`)
//! - [`memory::MemoryStore`] - in-process, for tests and local runs
//!
//! # Schema
//!
//! There is no migration tooling. [`ensure_schema`] creates the tables if
//! they are missing and is safe to run on every startup.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use ostaa_core::{Item, KeywordPattern, NewItem, NewUser, User};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgMarketStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A search keyword could not be compiled into a pattern.
    #[error("invalid search pattern: {0}")]
    InvalidPattern(String),
}

/// Operations the marketplace needs from its document store.
///
/// Lookups by username use exact matching and return the earliest inserted
/// user when several share a name. Reference expansion keeps the stored
/// order and silently skips ids with no matching item.
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// All users, in insertion order.
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// All items, in insertion order.
    async fn list_items(&self) -> Result<Vec<Item>, RepositoryError>;

    /// Insert a user with empty listings and purchases.
    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Insert a standalone item.
    async fn insert_item(&self, item: NewItem) -> Result<Item, RepositoryError>;

    /// First user whose username equals `username`.
    async fn find_user(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Insert `item` and append its id to the user's listings as one step.
    ///
    /// Returns `None` without creating anything when the user does not exist.
    async fn add_listing(
        &self,
        username: &str,
        item: NewItem,
    ) -> Result<Option<Item>, RepositoryError>;

    /// Users whose username matches `pattern` (case-insensitive).
    async fn search_users(&self, pattern: &KeywordPattern) -> Result<Vec<User>, RepositoryError>;

    /// Items whose description matches `pattern` (case-insensitive).
    async fn search_items(&self, pattern: &KeywordPattern) -> Result<Vec<Item>, RepositoryError>;

    /// The user's listings expanded into items, `None` if the user is absent.
    async fn listings(&self, username: &str) -> Result<Option<Vec<Item>>, RepositoryError>;

    /// The user's purchases expanded into items, `None` if the user is absent.
    async fn purchases(&self, username: &str) -> Result<Option<Vec<Item>>, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

const SCHEMA: &[&str] = &[
    "CREATE SCHEMA IF NOT EXISTS market",
    r"
    CREATE TABLE IF NOT EXISTS market.items (
        id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        seq         BIGINT GENERATED ALWAYS AS IDENTITY,
        title       TEXT NOT NULL,
        description TEXT NOT NULL,
        image       TEXT NOT NULL,
        price       DOUBLE PRECISION NOT NULL,
        stat        TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS market.users (
        id        UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        seq       BIGINT GENERATED ALWAYS AS IDENTITY,
        username  TEXT NOT NULL,
        password  TEXT NOT NULL,
        listings  UUID[] NOT NULL DEFAULT '{}',
        purchases UUID[] NOT NULL DEFAULT '{}'
    )
    ",
    "CREATE INDEX IF NOT EXISTS users_username_idx ON market.users (username)",
];

/// Create the `market` schema and its tables if they do not exist.
///
/// # Errors
///
/// Returns `sqlx::Error` if any statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query::<sqlx::Postgres>(statement)
            .execute(pool)
            .await?;
    }
    Ok(())
}
