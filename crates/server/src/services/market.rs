//! Marketplace Data Access Layer.
//!
//! Typed create/read/search/link operations over a [`MarketStore`]. The
//! service owns no state of its own beyond the store handle and the search
//! mode; every call is a direct pass-through with username resolution and
//! error classification on top.

use std::sync::Arc;

use ostaa_core::{Item, KeywordPattern, NewItem, NewUser, SearchMode, User};
use thiserror::Error;
use tracing::{info, instrument};

use crate::db::{MarketStore, RepositoryError};

/// Errors returned by [`MarketService`].
#[derive(Debug, Error)]
pub enum MarketError {
    /// The referenced user does not exist.
    #[error("user not found: {0}")]
    NotFound(String),

    /// The underlying store operation failed.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Data Access Layer for users and items.
#[derive(Clone)]
pub struct MarketService {
    store: Arc<dyn MarketStore>,
    search_mode: SearchMode,
}

impl MarketService {
    /// Create a service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>, search_mode: SearchMode) -> Self {
        Self { store, search_mode }
    }

    /// Return every user as stored, password included.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Store` if the store read fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, MarketError> {
        Ok(self.store.list_users().await?)
    }

    /// Return every item.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Store` if the store read fails.
    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<Item>, MarketError> {
        Ok(self.store.list_items().await?)
    }

    /// Create a user with empty listings and purchases.
    ///
    /// Existing users with the same name are not checked.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Store` if the write fails.
    #[instrument(skip(self, password))]
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User, MarketError> {
        let user = self
            .store
            .insert_user(NewUser {
                username: username.to_owned(),
                password: password.to_owned(),
            })
            .await?;
        info!(user_id = %user.id, "New user added");
        Ok(user)
    }

    /// Create a standalone item not linked to any user.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Store` if the write fails.
    #[instrument(skip(self, item), fields(title = %item.title))]
    pub async fn create_item(&self, item: NewItem) -> Result<Item, MarketError> {
        Ok(self.store.insert_item(item).await?)
    }

    /// Create an item and append it to `username`'s listings.
    ///
    /// The store performs the insert and the append as one atomic step, so a
    /// failure never leaves an item without an owner.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` if no user has that username (no item
    /// is created), `MarketError::Store` if the write fails.
    #[instrument(skip(self, item), fields(title = %item.title))]
    pub async fn add_item_to_user(&self, username: &str, item: NewItem) -> Result<Item, MarketError> {
        let item = self
            .store
            .add_listing(username, item)
            .await?
            .ok_or_else(|| MarketError::NotFound(username.to_owned()))?;
        info!(item_id = %item.id, "New item added to {username}'s listings: {}", item.title);
        Ok(item)
    }

    /// Users whose username contains `keyword`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Store` if the search fails, including a keyword
    /// that is not a valid expression in pattern mode.
    #[instrument(skip(self))]
    pub async fn search_users(&self, keyword: &str) -> Result<Vec<User>, MarketError> {
        let pattern = KeywordPattern::new(keyword, self.search_mode);
        Ok(self.store.search_users(&pattern).await?)
    }

    /// Items whose description (not title) contains `keyword`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Store` if the search fails, including a keyword
    /// that is not a valid expression in pattern mode.
    #[instrument(skip(self))]
    pub async fn search_items(&self, keyword: &str) -> Result<Vec<Item>, MarketError> {
        let pattern = KeywordPattern::new(keyword, self.search_mode);
        Ok(self.store.search_items(&pattern).await?)
    }

    /// The items `username` has listed, in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` if the user is absent,
    /// `MarketError::Store` if the read fails.
    #[instrument(skip(self))]
    pub async fn get_listings(&self, username: &str) -> Result<Vec<Item>, MarketError> {
        self.store
            .listings(username)
            .await?
            .ok_or_else(|| MarketError::NotFound(username.to_owned()))
    }

    /// The items `username` has bought.
    ///
    /// No operation records purchases yet, so this is empty for every user.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::NotFound` if the user is absent,
    /// `MarketError::Store` if the read fails.
    #[instrument(skip(self))]
    pub async fn get_purchases(&self, username: &str) -> Result<Vec<Item>, MarketError> {
        self.store
            .purchases(username)
            .await?
            .ok_or_else(|| MarketError::NotFound(username.to_owned()))
    }

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Store` if the store cannot be reached.
    pub async fn ping(&self) -> Result<(), MarketError> {
        Ok(self.store.ping().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn service(mode: SearchMode) -> MarketService {
        MarketService::new(Arc::new(MemoryStore::new()), mode)
    }

    fn bike() -> NewItem {
        NewItem {
            title: "Bike".to_string(),
            description: "Road bike".to_string(),
            image: "bike.png".to_string(),
            price: 100.0,
            stat: "used".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_keeps_password_verbatim() {
        let market = service(SearchMode::Literal);
        market.create_user("alice", "secret").await.unwrap();

        let users = market.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[0].password, "secret");
    }

    #[tokio::test]
    async fn test_create_item_is_unlinked() {
        let market = service(SearchMode::Literal);
        market.create_user("alice", "secret").await.unwrap();

        let item = market.create_item(bike()).await.unwrap();

        assert_eq!(market.list_items().await.unwrap(), vec![item]);
        assert!(market.get_listings("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_item_round_trips_through_listings() {
        let market = service(SearchMode::Literal);
        market.create_user("alice", "secret").await.unwrap();

        let created = market.add_item_to_user("alice", bike()).await.unwrap();
        let listings = market.get_listings("alice").await.unwrap();

        assert_eq!(listings, vec![bike().into_item(created.id)]);
        let user = &market.list_users().await.unwrap()[0];
        assert_eq!(user.listings, vec![created.id]);
    }

    #[tokio::test]
    async fn test_add_item_to_missing_user() {
        let market = service(SearchMode::Literal);

        let err = market.add_item_to_user("bob", bike()).await.unwrap_err();

        assert!(matches!(err, MarketError::NotFound(ref name) if name == "bob"));
        assert!(market.list_items().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_keep_every_listing() {
        const ADDS: usize = 50;
        let market = service(SearchMode::Literal);
        market.create_user("alice", "secret").await.unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for n in 0..ADDS {
            let market = market.clone();
            tasks.spawn(async move {
                let mut item = bike();
                item.title = format!("Bike {n}");
                market.add_item_to_user("alice", item).await
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap().unwrap();
        }

        let listings = market.get_listings("alice").await.unwrap();
        assert_eq!(listings.len(), ADDS);
        assert_eq!(market.list_items().await.unwrap().len(), ADDS);
    }

    #[tokio::test]
    async fn test_search_items_matches_description_only() {
        let market = service(SearchMode::Literal);
        market.create_user("alice", "secret").await.unwrap();
        market.add_item_to_user("alice", bike()).await.unwrap();
        market
            .add_item_to_user(
                "alice",
                NewItem {
                    title: "Road atlas".to_string(),
                    description: "Paper maps".to_string(),
                    image: String::new(),
                    price: 5.0,
                    stat: "new".to_string(),
                },
            )
            .await
            .unwrap();

        let found = market.search_items("ROAD").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Bike");
    }

    #[tokio::test]
    async fn test_search_users_literal_and_pattern() {
        let literal = service(SearchMode::Literal);
        literal.create_user("alice", "a").await.unwrap();
        literal.create_user("Malice", "b").await.unwrap();
        literal.create_user("bob", "c").await.unwrap();

        assert_eq!(literal.search_users("LIC").await.unwrap().len(), 2);
        assert!(literal.search_users("^a").await.unwrap().is_empty());
        assert!(literal.search_users("zzz").await.unwrap().is_empty());

        let pattern = service(SearchMode::Pattern);
        pattern.create_user("alice", "a").await.unwrap();
        pattern.create_user("Malice", "b").await.unwrap();
        let found = pattern.search_users("^a").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "alice");
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_a_store_error() {
        let market = service(SearchMode::Pattern);
        let err = market.search_items("[").await.unwrap_err();
        assert!(matches!(
            err,
            MarketError::Store(RepositoryError::InvalidPattern(_))
        ));
    }

    #[tokio::test]
    async fn test_purchases_always_empty() {
        let market = service(SearchMode::Literal);
        market.create_user("alice", "secret").await.unwrap();
        market.add_item_to_user("alice", bike()).await.unwrap();

        assert!(market.get_purchases("alice").await.unwrap().is_empty());
        assert!(matches!(
            market.get_purchases("nobody").await.unwrap_err(),
            MarketError::NotFound(_)
        ));
    }
}
