//! Canonical event types emitted by the vesting pool contract.
//!
//! These mirror the contract events defined in
//! `contracts/vesting_pool/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the vesting pool contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Vesting parameters were frozen (`params` topic).
    ParamsSet,
    /// Owner issued shares directly (`minted` topic).
    SharesMinted,
    /// Owner deposited underlying (`deposited` topic).
    Deposited,
    /// A holder claimed contribution-based shares (`claimed` topic).
    SharesClaimed,
    /// Shares moved between holders (`transfer` topic).
    SharesTransferred,
    /// A holder redeemed, possibly forfeiting (`redeemed` topic).
    Redeemed,
    /// A force-vested withdrawal (`emergency` topic).
    EmergencyWithdrawn,
    /// Shutdown / force-vest flags changed (`shutdown` topic).
    ShutdownChanged,
    /// Owner recovered an asset (`recovered` topic).
    FundsRecovered,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "params" => Self::ParamsSet,
            "minted" => Self::SharesMinted,
            "deposited" => Self::Deposited,
            "claimed" => Self::SharesClaimed,
            "transfer" => Self::SharesTransferred,
            "redeemed" => Self::Redeemed,
            "emergency" => Self::EmergencyWithdrawn,
            "shutdown" => Self::ShutdownChanged,
            "recovered" => Self::FundsRecovered,
            _ => Self::Unknown,
        }
    }

    /// Short identifier stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParamsSet => "params_set",
            Self::SharesMinted => "shares_minted",
            Self::Deposited => "deposited",
            Self::SharesClaimed => "shares_claimed",
            Self::SharesTransferred => "shares_transferred",
            Self::Redeemed => "redeemed",
            Self::EmergencyWithdrawn => "emergency_withdrawn",
            Self::ShutdownChanged => "shutdown_changed",
            Self::FundsRecovered => "funds_recovered",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(s: &str) -> Self {
        [
            Self::ParamsSet,
            Self::SharesMinted,
            Self::Deposited,
            Self::SharesClaimed,
            Self::SharesTransferred,
            Self::Redeemed,
            Self::EmergencyWithdrawn,
            Self::ShutdownChanged,
            Self::FundsRecovered,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == s)
        .unwrap_or(Self::Unknown)
    }
}

/// A decoded pool event, ready to be stored.
///
/// `amount` is the underlying moved (deposit, payout, recovery) and `shares`
/// the share units created or destroyed; both are decimal strings since the
/// contract works in `i128`. `counterparty` is the second party named in the
/// topics, which only transfers carry (the recipient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEvent {
    pub event_id: Option<String>,
    pub event_type: String,
    pub holder: Option<String>,
    pub counterparty: Option<String>,
    pub amount: Option<String>,
    pub shares: Option<String>,
    pub forfeit_shares: Option<String>,
    /// Raw event data as JSON text.
    pub payload: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// An event row as read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: Option<String>,
    pub event_type: String,
    pub holder: Option<String>,
    pub counterparty: Option<String>,
    pub amount: Option<String>,
    pub shares: Option<String>,
    pub forfeit_shares: Option<String>,
    pub payload: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Pool totals rebuilt from indexed events.
///
/// Values are decimal strings so `i128` totals survive JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolSummary {
    pub deposited: String,
    pub withdrawn: String,
    pub recovered: String,
    pub shares_issued: String,
    pub shares_redeemed: String,
    pub shares_forfeited: String,
    pub redemptions: u64,
    pub emergency_withdrawals: u64,
}

impl PoolSummary {
    /// Fold event rows into totals; unparsable amounts count as zero.
    pub fn from_records(records: &[EventRecord]) -> Self {
        let mut deposited: i128 = 0;
        let mut withdrawn: i128 = 0;
        let mut recovered: i128 = 0;
        let mut issued: i128 = 0;
        let mut redeemed: i128 = 0;
        let mut forfeited: i128 = 0;
        let mut redemptions = 0u64;
        let mut emergency_withdrawals = 0u64;

        for record in records {
            let amount = parse_amount(record.amount.as_deref());
            let shares = parse_amount(record.shares.as_deref());
            let forfeit = parse_amount(record.forfeit_shares.as_deref());

            match EventKind::from_stored(&record.event_type) {
                EventKind::Deposited => deposited = deposited.saturating_add(amount),
                EventKind::SharesMinted | EventKind::SharesClaimed => {
                    issued = issued.saturating_add(shares)
                }
                EventKind::Redeemed => {
                    redemptions += 1;
                    withdrawn = withdrawn.saturating_add(amount);
                    redeemed = redeemed.saturating_add(shares.saturating_sub(forfeit));
                    forfeited = forfeited.saturating_add(forfeit);
                }
                EventKind::EmergencyWithdrawn => {
                    emergency_withdrawals += 1;
                    withdrawn = withdrawn.saturating_add(amount);
                    redeemed = redeemed.saturating_add(shares);
                }
                EventKind::FundsRecovered => recovered = recovered.saturating_add(amount),
                _ => {}
            }
        }

        PoolSummary {
            deposited: deposited.to_string(),
            withdrawn: withdrawn.to_string(),
            recovered: recovered.to_string(),
            shares_issued: issued.to_string(),
            shares_redeemed: redeemed.to_string(),
            shares_forfeited: forfeited.to_string(),
            redemptions,
            emergency_withdrawals,
        }
    }
}

fn parse_amount(raw: Option<&str>) -> i128 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}
