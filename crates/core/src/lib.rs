//! Ostaa Core - Shared domain types.
//!
//! This crate provides the types used by the marketplace server and its tests:
//! - typed identifiers for users and items
//! - the `User` and `Item` documents and their creation payloads
//! - keyword search patterns
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. The optional `postgres` feature adds `sqlx` support for the ids.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
