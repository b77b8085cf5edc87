//! Business logic services.

pub mod market;

pub use market::{MarketError, MarketService};
