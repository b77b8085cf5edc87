//! User documents.

use serde::{Deserialize, Serialize};

use super::{ItemId, UserId};

/// A marketplace user.
///
/// `password` is stored and returned exactly as submitted. There is no
/// hashing and listing endpoints return it in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct User {
    /// Store-generated id.
    pub id: UserId,
    /// Intended to be unique, not enforced.
    pub username: String,
    pub password: String,
    /// Items this user has for sale, in the order they were added.
    pub listings: Vec<ItemId>,
    /// Items this user has bought. Nothing writes this field yet.
    pub purchases: Vec<ItemId>,
}

/// Fields supplied when creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

impl NewUser {
    /// Attach a store-generated id. Listings and purchases start empty.
    #[must_use]
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            password: self.password,
            listings: Vec::new(),
            purchases: Vec::new(),
        }
    }
}
