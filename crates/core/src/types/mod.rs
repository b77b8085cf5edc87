//! Core types for the marketplace.

pub mod id;
pub mod item;
pub mod search;
pub mod user;

pub use id::*;
pub use item::{Item, NewItem};
pub use search::{KeywordPattern, SearchMode, SearchModeError};
pub use user::{NewUser, User};
