//! Vesting Pool Event Indexer entry point.
//!
//! Starts a background indexer task that polls Soroban `getEvents` RPC for
//! vesting pool contract events and persists them to SQLite.  Simultaneously
//! exposes a small Axum REST API for frontend / admin consumption.

mod api;
mod config;
mod db;
mod errors;
mod events;
mod indexer;
mod rpc;

use std::sync::Arc;

use axum::{routing::get, Router};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use indexer::IndexerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load optional .env file (ignored if missing) before reading RUST_LOG.
    let _ = dotenvy::dotenv();

    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    db::migrate(&pool).await?;

    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let shutdown = CancellationToken::new();

    // ─── Background indexer ───────────────────────────────
    let indexer_state = Arc::new(IndexerState {
        pool: pool.clone(),
        config: config.clone(),
        client,
    });
    let indexer_task = tokio::spawn(indexer::run(indexer_state, shutdown.clone()));

    // ─── REST API ─────────────────────────────────────────
    let api_state = Arc::new(api::ApiState { pool: pool.clone() });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/events", get(api::get_all_events))
        .route("/holders/:address/events", get(api::get_holder_events))
        .route("/pool/summary", get(api::get_pool_summary))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(api_state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    indexer_task.await.map_err(errors::IndexerError::from)?;
    pool.close().await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C, cancelling `token` so the indexer stops too.
async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Ctrl-C received, shutting down"),
        _ = token.cancelled() => {}
    }
    token.cancel();
}
