//! Ostaa marketplace server.
//!
//! Stores users and items, links items to a user's listings, and exposes
//! search and retrieval endpoints as JSON over HTTP on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, one handler per route
//! - `PostgreSQL` as the document store (`memory:` for an in-process store)
//! - Static landing page and assets served from the public directory
//!
//! # Known gaps
//!
//! There is no authentication, no password hashing and no pagination.
//! Passwords are returned by the user listing endpoints exactly as stored.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::ServiceExt;
use axum::extract::Request;
use ostaa_server::config::{LogFormat, MarketConfig};
use ostaa_server::db::{self, MarketStore, MemoryStore, PgMarketStore};
use ostaa_server::services::MarketService;
use ostaa_server::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &MarketConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = MarketConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ostaa_server=info,tower_http=debug".into());

    let is_json = config.log_format == LogFormat::Json;
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Acquire the store before serving; the pool is released after shutdown
    let pool = if config.uses_memory_store() {
        None
    } else {
        let pool = db::create_pool(&config.database_url, config.db_max_connections)
            .await
            .expect("Failed to create database pool");
        tracing::info!("Database pool created");

        db::ensure_schema(&pool)
            .await
            .expect("Failed to create database schema");
        Some(pool)
    };

    let store: Arc<dyn MarketStore> = match &pool {
        Some(pool) => Arc::new(PgMarketStore::new(pool.clone())),
        None => {
            tracing::warn!("Using in-memory store, data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    tracing::info!(search_mode = %config.search_mode, "Keyword search mode");
    let market = MarketService::new(store, config.search_mode);
    let state = AppState::new(market, config.public_dir.clone());
    let app = ostaa_server::app::build(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("Server is listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
