//! `PostgreSQL`-backed document store.
//!
//! Queries are built at runtime (`query_as`) so the crate builds without a
//! live database or an offline query cache.

use async_trait::async_trait;
use ostaa_core::{Item, ItemId, KeywordPattern, NewItem, NewUser, User, UserId};
use sqlx::PgPool;
use tracing::{debug, instrument};

use super::{MarketStore, RepositoryError};

/// SQLSTATE raised for a malformed regular expression.
const INVALID_REGULAR_EXPRESSION: &str = "2201B";

/// Store over the `market` schema.
#[derive(Debug, Clone)]
pub struct PgMarketStore {
    pool: PgPool,
}

impl PgMarketStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Load the items behind `ids`, preserving the order of `ids`.
    async fn expand(&self, ids: &[ItemId]) -> Result<Vec<Item>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let items = sqlx::query_as::<_, Item>(
            r"
            SELECT i.id, i.title, i.description, i.image, i.price, i.stat
            FROM unnest($1::uuid[]) WITH ORDINALITY AS r(id, ord)
            JOIN market.items i ON i.id = r.id
            ORDER BY r.ord
            ",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        if items.len() < ids.len() {
            debug!(
                referenced = ids.len(),
                found = items.len(),
                "Skipped dangling item references"
            );
        }
        Ok(items)
    }
}

/// Map a regex failure raised by `PostgreSQL` to [`RepositoryError::InvalidPattern`].
fn pattern_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.code().as_deref() == Some(INVALID_REGULAR_EXPRESSION)
    {
        return RepositoryError::InvalidPattern(db_err.message().to_owned());
    }
    RepositoryError::Database(err)
}

#[async_trait]
impl MarketStore for PgMarketStore {
    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password, listings, purchases FROM market.users ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn list_items(&self) -> Result<Vec<Item>, RepositoryError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, title, description, image, price, stat FROM market.items ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO market.users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password, listings, purchases
            ",
        )
        .bind(&user.username)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self, item), fields(title = %item.title))]
    async fn insert_item(&self, item: NewItem) -> Result<Item, RepositoryError> {
        let item = sqlx::query_as::<_, Item>(
            r"
            INSERT INTO market.items (title, description, image, price, stat)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, image, price, stat
            ",
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.image)
        .bind(item.price)
        .bind(&item.stat)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn find_user(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, password, listings, purchases
            FROM market.users
            WHERE username = $1
            ORDER BY seq
            LIMIT 1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self, item), fields(title = %item.title))]
    async fn add_listing(
        &self,
        username: &str,
        item: NewItem,
    ) -> Result<Option<Item>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises concurrent appends to the same user.
        let user_id = sqlx::query_scalar::<_, UserId>(
            r"
            SELECT id FROM market.users
            WHERE username = $1
            ORDER BY seq
            LIMIT 1
            FOR UPDATE
            ",
        )
        .bind(username)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            tx.rollback().await?;
            return Ok(None);
        };

        let item = sqlx::query_as::<_, Item>(
            r"
            INSERT INTO market.items (title, description, image, price, stat)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, image, price, stat
            ",
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.image)
        .bind(item.price)
        .bind(&item.stat)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query::<sqlx::Postgres>(
            "UPDATE market.users SET listings = array_append(listings, $1) WHERE id = $2",
        )
        .bind(item.id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(item_id = %item.id, user_id = %user_id, "Listing appended");
        Ok(Some(item))
    }

    #[instrument(skip(self, pattern), fields(pattern = %pattern))]
    async fn search_users(&self, pattern: &KeywordPattern) -> Result<Vec<User>, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            SELECT id, username, password, listings, purchases
            FROM market.users
            WHERE username ~* $1
            ORDER BY seq
            ",
        )
        .bind(pattern.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(pattern_error)
    }

    #[instrument(skip(self, pattern), fields(pattern = %pattern))]
    async fn search_items(&self, pattern: &KeywordPattern) -> Result<Vec<Item>, RepositoryError> {
        sqlx::query_as::<_, Item>(
            r"
            SELECT id, title, description, image, price, stat
            FROM market.items
            WHERE description ~* $1
            ORDER BY seq
            ",
        )
        .bind(pattern.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(pattern_error)
    }

    #[instrument(skip(self))]
    async fn listings(&self, username: &str) -> Result<Option<Vec<Item>>, RepositoryError> {
        let Some(user) = self.find_user(username).await? else {
            return Ok(None);
        };
        self.expand(&user.listings).await.map(Some)
    }

    #[instrument(skip(self))]
    async fn purchases(&self, username: &str) -> Result<Option<Vec<Item>>, RepositoryError> {
        let Some(user) = self.find_user(username).await? else {
            return Ok(None);
        };
        self.expand(&user.purchases).await.map(Some)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query::<sqlx::Postgres>("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
