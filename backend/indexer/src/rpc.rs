//! Soroban RPC client: polls `getEvents` and decodes vesting pool events.
//!
//! Events are requested with `xdrFormat: "json"`, so topics and data arrive
//! as JSON-encoded `ScVal`s (`{"symbol":"redeemed"}`, `{"i128":"25"}`,
//! `{"map":[{"key":..,"val":..}]}`) in `topicJson` / `valueJson` rather
//! than as base64 XDR.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * After [`MAX_ATTEMPTS`] consecutive failures the poll gives up and the
//!   indexer loop tries again on its next tick.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, PoolEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;
const MAX_ATTEMPTS: u32 = 8;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Topics as JSON `ScVal`s; empty if the server ignored `xdrFormat`.
    #[serde(rename = "topicJson", default)]
    pub topic_json: Vec<Value>,
    /// Event data as a JSON `ScVal`.
    #[serde(rename = "valueJson")]
    pub value_json: Option<Value>,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

/// One page of events plus where to continue from.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive).
/// * `cursor`: optional opaque pagination cursor from a previous response.
/// * `limit`: maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let mut backoff = INITIAL_BACKOFF_SECS;
    let params = build_params(contract_id, start_ledger, cursor, limit);

    for attempt in 1..=MAX_ATTEMPTS {
        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        let retry_reason = match response {
            Err(e) => format!("request failed: {e}"),
            Ok(resp) if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                "rate-limited".to_string()
            }
            Ok(resp) => {
                let body: RpcResponse = resp.json().await?;
                match body.error {
                    // Invalid request / unknown method will never succeed.
                    Some(err) if err.code == -32600 || err.code == -32601 => {
                        return Err(IndexerError::Rpc {
                            code: err.code,
                            message: err.message,
                        });
                    }
                    Some(err) => format!("soft error {} {}", err.code, err.message),
                    None => {
                        let result = body.result.ok_or_else(|| {
                            IndexerError::EventParse("Empty result from getEvents".to_string())
                        })?;
                        debug!(
                            "Fetched {} events (latest_ledger={:?})",
                            result.events.len(),
                            result.latest_ledger
                        );
                        return Ok(EventPage {
                            events: result.events,
                            cursor: result.cursor,
                            latest_ledger: result.latest_ledger,
                        });
                    }
                }
            }
        };

        warn!(attempt, "RPC {retry_reason} (will retry in {backoff}s)");
        tokio::time::sleep(Duration::from_secs(backoff)).await;
        backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
    }

    Err(IndexerError::RetriesExhausted(MAX_ATTEMPTS))
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events into [`PoolEvent`]s.
///
/// Events from failed contract calls are dropped; the host rolled back their
/// state changes.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<PoolEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

/// Fields pulled out of an event's data blob.
#[derive(Debug, Default, PartialEq)]
struct Decoded {
    amount: Option<String>,
    shares: Option<String>,
    forfeit_shares: Option<String>,
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<PoolEvent> {
    let Some(first_topic) = raw.topic_json.first() else {
        debug!("Skipping event {:?} without JSON topics", raw.id);
        return None;
    };
    let kind = sc_val_to_json(first_topic)
        .as_ref()
        .and_then(Value::as_str)
        .map(EventKind::from_topic)
        .unwrap_or(EventKind::Unknown);

    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    // Topic 1 is the subject (holder or owner); transfers add the recipient.
    let holder = topic_string(raw, 1);
    let counterparty = topic_string(raw, 2);
    let data = raw
        .value_json
        .as_ref()
        .and_then(sc_val_to_json)
        .unwrap_or(Value::Null);
    let decoded = decode_data(&data, kind);

    Some(PoolEvent {
        event_id: raw.id.clone(),
        event_type: kind.as_str().to_string(),
        holder,
        counterparty,
        amount: decoded.amount,
        shares: decoded.shares,
        forfeit_shares: decoded.forfeit_shares,
        payload: Some(data.to_string()),
        ledger: raw.ledger.unwrap_or(0) as i64,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

fn topic_string(raw: &RawEvent, index: usize) -> Option<String> {
    raw.topic_json
        .get(index)
        .and_then(sc_val_to_json)
        .and_then(|v| v.as_str().map(str::to_string))
}

fn decode_data(data: &Value, kind: EventKind) -> Decoded {
    match kind {
        EventKind::ParamsSet => Decoded {
            amount: field(data, "initial_goal_value"),
            ..Decoded::default()
        },
        EventKind::SharesMinted | EventKind::SharesClaimed | EventKind::SharesTransferred => {
            Decoded {
                shares: field(data, "shares"),
                ..Decoded::default()
            }
        }
        EventKind::Deposited | EventKind::FundsRecovered => Decoded {
            amount: field(data, "amount"),
            ..Decoded::default()
        },
        EventKind::Redeemed => Decoded {
            amount: field(data, "withdrawable_underlying"),
            shares: field(data, "shares_burned"),
            forfeit_shares: field(data, "forfeit_shares"),
        },
        EventKind::EmergencyWithdrawn => Decoded {
            amount: field(data, "underlying"),
            shares: field(data, "shares_burned"),
            ..Decoded::default()
        },
        EventKind::ShutdownChanged | EventKind::Unknown => Decoded::default(),
    }
}

/// String value of `key` in a struct already passed through [`sc_val_to_json`].
fn field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Flatten a JSON-encoded `ScVal` into plain JSON.
///
/// Integers of every width become decimal strings so `i128` values survive;
/// symbols, strings and addresses become strings; maps with symbol keys
/// (how `#[contracttype]` structs are encoded) become objects.
fn sc_val_to_json(val: &Value) -> Option<Value> {
    match val {
        Value::String(s) if s == "void" => Some(Value::Null),
        Value::Object(map) if map.len() == 1 => {
            let (tag, inner) = map.iter().next()?;
            match tag.as_str() {
                "bool" => inner.as_bool().map(Value::Bool),
                "u32" | "i32" | "u64" | "i64" | "timepoint" | "duration" | "u128" | "i128"
                | "u256" | "i256" => integer_string(inner).map(Value::String),
                "symbol" | "string" | "address" => inner.as_str().map(|s| Value::String(s.to_string())),
                "vec" => Some(match inner {
                    Value::Array(items) => {
                        Value::Array(items.iter().filter_map(sc_val_to_json).collect())
                    }
                    _ => Value::Null,
                }),
                "map" => {
                    let entries: &[Value] = match inner {
                        Value::Array(entries) => entries.as_slice(),
                        _ => &[],
                    };
                    let mut object = serde_json::Map::new();
                    for entry in entries {
                        let key = entry.get("key").and_then(sc_val_to_json)?;
                        let value = entry.get("val").and_then(sc_val_to_json)?;
                        let key = match key {
                            Value::String(s) => s,
                            other => other.to_string(),
                        };
                        object.insert(key, value);
                    }
                    Some(Value::Object(object))
                }
                _ => Some(inner.clone()),
            }
        }
        _ => None,
    }
}

/// Decimal text of an integer `ScVal` body: a number, a decimal string, or
/// `{"hi":..,"lo":..}` parts.
fn integer_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(parts) => {
            let hi: i128 = parts.get("hi").and_then(integer_string)?.parse().ok()?;
            let lo: i128 = parts.get("lo").and_then(integer_string)?.parse().ok()?;
            hi.checked_mul(1 << 64)?.checked_add(lo).map(|n| n.to_string())
        }
        _ => None,
    }
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
