//! In-process document store.
//!
//! Keeps both collections behind one `RwLock`, so `add_listing` inserts the
//! item and appends the reference under a single write guard. Nothing is
//! persisted; used by the test suites and by `MARKET_DATABASE_URL=memory:`.

use async_trait::async_trait;
use ostaa_core::{Item, ItemId, KeywordPattern, NewItem, NewUser, User, UserId};
use tokio::sync::RwLock;

use super::{MarketStore, RepositoryError};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    items: Vec<Item>,
}

impl Collections {
    fn find_user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    fn expand(&self, ids: &[ItemId]) -> Vec<Item> {
        ids.iter()
            .filter_map(|id| self.items.iter().find(|item| item.id == *id))
            .cloned()
            .collect()
    }
}

/// Document store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn compile(pattern: &KeywordPattern) -> Result<regex::Regex, RepositoryError> {
    pattern
        .compile()
        .map_err(|e| RepositoryError::InvalidPattern(e.to_string()))
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.collections.read().await.users.clone())
    }

    async fn list_items(&self) -> Result<Vec<Item>, RepositoryError> {
        Ok(self.collections.read().await.items.clone())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let user = user.into_user(UserId::generate());
        self.collections.write().await.users.push(user.clone());
        Ok(user)
    }

    async fn insert_item(&self, item: NewItem) -> Result<Item, RepositoryError> {
        let item = item.into_item(ItemId::generate());
        self.collections.write().await.items.push(item.clone());
        Ok(item)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.collections.read().await.find_user(username).cloned())
    }

    async fn add_listing(
        &self,
        username: &str,
        item: NewItem,
    ) -> Result<Option<Item>, RepositoryError> {
        let mut collections = self.collections.write().await;

        let Some(owner) = collections.users.iter().position(|u| u.username == username) else {
            return Ok(None);
        };

        let item = item.into_item(ItemId::generate());
        collections.items.push(item.clone());
        if let Some(user) = collections.users.get_mut(owner) {
            user.listings.push(item.id);
        }
        Ok(Some(item))
    }

    async fn search_users(&self, pattern: &KeywordPattern) -> Result<Vec<User>, RepositoryError> {
        let re = compile(pattern)?;
        let collections = self.collections.read().await;
        Ok(collections
            .users
            .iter()
            .filter(|u| re.is_match(&u.username))
            .cloned()
            .collect())
    }

    async fn search_items(&self, pattern: &KeywordPattern) -> Result<Vec<Item>, RepositoryError> {
        let re = compile(pattern)?;
        let collections = self.collections.read().await;
        Ok(collections
            .items
            .iter()
            .filter(|item| re.is_match(&item.description))
            .cloned()
            .collect())
    }

    async fn listings(&self, username: &str) -> Result<Option<Vec<Item>>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections
            .find_user(username)
            .map(|user| collections.expand(&user.listings)))
    }

    async fn purchases(&self, username: &str) -> Result<Option<Vec<Item>>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections
            .find_user(username)
            .map(|user| collections.expand(&user.purchases)))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
