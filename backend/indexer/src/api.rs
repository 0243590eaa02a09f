//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::IndexerError;
use crate::events::{EventRecord, PoolSummary};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HolderEventsResponse {
    pub holder: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventsFilter {
    /// Stored event type, e.g. `redeemed` or `shares_claimed`.
    pub event_type: Option<String>,
}

fn internal_error(e: IndexerError) -> Response {
    error!("API query failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /holders/:address/events`
///
/// Every indexed event naming the address as its subject.
pub async fn get_holder_events(
    State(state): State<Arc<ApiState>>,
    Path(holder): Path<String>,
) -> Response {
    match db::get_events_for_holder(&state.pool, &holder).await {
        Ok(events) => {
            let count = events.len();
            (
                StatusCode::OK,
                Json(HolderEventsResponse {
                    holder,
                    count,
                    events,
                }),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// `GET /events[?event_type=...]`
pub async fn get_all_events(
    State(state): State<Arc<ApiState>>,
    Query(filter): Query<EventsFilter>,
) -> Response {
    match db::get_all_events(&state.pool, filter.event_type.as_deref()).await {
        Ok(events) => {
            let count = events.len();
            (StatusCode::OK, Json(AllEventsResponse { count, events })).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// `GET /pool/summary`
///
/// Deposit, payout and share totals rebuilt from the indexed history.
pub async fn get_pool_summary(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_summary_records(&state.pool).await {
        Ok(records) => (StatusCode::OK, Json(PoolSummary::from_records(&records))).into_response(),
        Err(e) => internal_error(e),
    }
}
