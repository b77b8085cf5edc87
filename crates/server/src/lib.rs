//! Ostaa marketplace server library.
//!
//! This crate provides the server as a library, allowing it to be tested
//! in-process and reused.
//!
//! # Layers
//!
//! - [`db`] - document store seam (`PostgreSQL` and in-memory)
//! - [`services`] - Data Access Layer
//! - [`routes`] - HTTP API Layer
//! - [`app`] - router assembly and the Static Asset Responder

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod routes;
pub mod services;
pub mod state;
