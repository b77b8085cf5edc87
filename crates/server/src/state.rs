//! Application state shared across handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::services::MarketService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the Data Access Layer and the static asset directory.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    market: MarketService,
    public_dir: PathBuf,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `market` - Data Access Layer over the configured store
    /// * `public_dir` - Directory holding `index.html` and other static files
    #[must_use]
    pub fn new(market: MarketService, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                market,
                public_dir: public_dir.into(),
            }),
        }
    }

    /// Get a reference to the marketplace service.
    #[must_use]
    pub fn market(&self) -> &MarketService {
        &self.inner.market
    }

    /// Get the static asset directory.
    #[must_use]
    pub fn public_dir(&self) -> &Path {
        &self.inner.public_dir
    }
}
