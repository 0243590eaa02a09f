//! Long-running background task that polls the Soroban RPC and writes
//! decoded vesting pool events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Run the indexer loop until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!("Indexer starting, contract: {}", state.config.contract_id);

    let (mut current_ledger, mut cursor) = match resume_point(&state).await {
        Ok(point) => point,
        Err(e) => {
            error!("Failed to load indexer cursor: {e}");
            (state.config.start_ledger, None)
        }
    };

    info!("Resuming from ledger {current_ledger}");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            polled = poll_once(
                &state.pool,
                &state.client,
                &state.config,
                current_ledger,
                cursor.as_deref(),
            ) => match polled {
                Ok((next_ledger, next_cursor)) => {
                    current_ledger = next_ledger;
                    cursor = next_cursor;
                }
                Err(e) => error!("Indexer poll error: {e}"),
            },
        }

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }

    info!("Indexer stopped at ledger {current_ledger}");
}

/// Saved cursor if any, else the configured start ledger.
async fn resume_point(state: &IndexerState) -> Result<(u32, Option<String>)> {
    let last_ledger = db::get_last_ledger(&state.pool).await?;
    let cursor = db::get_cursor_string(&state.pool).await?;
    let ledger = if last_ledger > 0 {
        u32::try_from(last_ledger).unwrap_or(u32::MAX)
    } else {
        state.config.start_ledger
    };
    Ok((ledger, cursor))
}

/// Perform a single poll iteration.
///
/// Returns `(next_start_ledger, next_cursor)`.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    start_ledger: u32,
    cursor: Option<&str>,
) -> Result<(u32, Option<String>)> {
    let page = rpc::fetch_events(
        client,
        &config.rpc_url,
        &config.contract_id,
        start_ledger,
        cursor,
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            "Polled {} raw events → {} new records stored",
            page.events.len(),
            inserted
        );
    }

    let next_ledger = next_start_ledger(start_ledger, page.latest_ledger);
    // An empty page may come back without a cursor; keep the old one then.
    let next_cursor = page.cursor.or_else(|| cursor.map(str::to_string));

    db::save_cursor(pool, next_ledger as i64, next_cursor.as_deref()).await?;

    Ok((next_ledger, next_cursor))
}

/// The ledger to scan from next; never moves backwards.
fn next_start_ledger(start_ledger: u32, latest_ledger: Option<u64>) -> u32 {
    latest_ledger
        .map(|l| u32::try_from(l).unwrap_or(u32::MAX).max(start_ledger))
        .unwrap_or(start_ledger)
}
