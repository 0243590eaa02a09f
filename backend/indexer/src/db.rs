//! Database layer: migrations, queries, and cursor management.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{EventRecord, PoolEvent};

const EVENT_COLUMNS: &str = "id, event_id, event_type, holder, counterparty, amount, shares, \
     forfeit_shares, payload, ledger, timestamp, contract_id, tx_hash, created_at";

/// Establish a SQLite connection pool.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(&url)
        .await?;
    Ok(pool)
}

/// Apply pending migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger and the pagination cursor, if any.
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events inside one transaction.
///
/// Events whose RPC `event_id` is already stored are ignored, so re-polling a
/// ledger range never duplicates rows. Returns the number of new rows.
pub async fn insert_events(pool: &SqlitePool, events: &[PoolEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, holder, counterparty, amount, shares,
                 forfeit_shares, payload, ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.holder)
        .bind(&ev.counterparty)
        .bind(&ev.amount)
        .bind(&ev.shares)
        .bind(&ev.forfeit_shares)
        .bind(&ev.payload)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events naming `holder` as subject or counterparty, oldest first.
pub async fn get_events_for_holder(pool: &SqlitePool, holder: &str) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE holder = ?1 OR counterparty = ?1 \
         ORDER BY ledger ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(holder)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fetch all events, optionally restricted to one `event_type`, oldest first.
pub async fn get_all_events(
    pool: &SqlitePool,
    event_type: Option<&str>,
) -> Result<Vec<EventRecord>> {
    let rows = match event_type {
        Some(kind) => {
            let sql = format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE event_type = ?1 \
                 ORDER BY ledger ASC, id ASC"
            );
            sqlx::query_as::<_, EventRecord>(&sql)
                .bind(kind)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY ledger ASC, id ASC");
            sqlx::query_as::<_, EventRecord>(&sql).fetch_all(pool).await?
        }
    };
    Ok(rows)
}

/// Rows that move pool totals: deposits, issues, exits and recoveries.
pub async fn get_summary_records(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events \
         WHERE event_type IN ('deposited', 'shares_minted', 'shares_claimed', \
                              'redeemed', 'emergency_withdrawn', 'funds_recovered') \
         ORDER BY ledger ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EventRecord>(&sql).fetch_all(pool).await?;
    Ok(rows)
}
