//! # Storage
//!
//! Typed helpers over Soroban's two storage tiers used by the pool:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key          | Type             | Description                           |
//! |--------------|------------------|---------------------------------------|
//! | `Setup`      | `PoolSetup`      | Owner, oracle and underlying token    |
//! | `Config`     | `VestingConfig`  | Write-once vesting parameters         |
//! | `Pool`       | `PoolState`      | Supply, custody and forfeit counters  |
//! | `Flags`      | `LifecycleFlags` | Shutdown / force-vest switches        |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key               | Type   | Description                         |
//! |-------------------|--------|-------------------------------------|
//! | `Balance(holder)` | `i128` | Share balance of one holder         |
//! | `Claimed(holder)` | `bool` | Holder has used its one-time claim  |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//! Zero balances are removed rather than stored.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{Amount, LifecycleFlags, PoolSetup, PoolState, VestingConfig};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// All contract storage keys.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Owner / oracle / underlying wiring (Instance).
    Setup,
    /// Frozen vesting parameters (Instance).
    Config,
    /// Pool accounting (Instance).
    Pool,
    /// Lifecycle flags (Instance).
    Flags,
    /// Share balance keyed by holder (Persistent).
    Balance(Address),
    /// One-time claim marker keyed by holder (Persistent).
    Claimed(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn has_setup(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Setup)
}

pub fn save_setup(env: &Env, setup: &PoolSetup) {
    env.storage().instance().set(&DataKey::Setup, setup);
    bump_instance(env);
}

/// `None` until `init` has run.
pub fn load_setup(env: &Env) -> Option<PoolSetup> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Setup)
}

/// `None` until the owner freezes the vesting parameters.
pub fn load_config(env: &Env) -> Option<VestingConfig> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Config)
}

pub fn save_config(env: &Env, config: &VestingConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

pub fn load_pool(env: &Env) -> PoolState {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Pool)
        .unwrap_or_default()
}

pub fn save_pool(env: &Env, pool: &PoolState) {
    env.storage().instance().set(&DataKey::Pool, pool);
    bump_instance(env);
}

pub fn load_flags(env: &Env) -> LifecycleFlags {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Flags)
        .unwrap_or_default()
}

pub fn save_flags(env: &Env, flags: &LifecycleFlags) {
    env.storage().instance().set(&DataKey::Flags, flags);
    bump_instance(env);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Share balance of `holder`; missing entries read as zero.
pub fn load_balance(env: &Env, holder: &Address) -> Amount {
    let key = DataKey::Balance(holder.clone());
    match env.storage().persistent().get::<_, Amount>(&key) {
        Some(balance) => {
            bump_persistent(env, &key);
            balance
        }
        None => 0,
    }
}

pub fn save_balance(env: &Env, holder: &Address, balance: Amount) {
    let key = DataKey::Balance(holder.clone());
    if balance == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, &balance);
    bump_persistent(env, &key);
}

pub fn is_claimed(env: &Env, holder: &Address) -> bool {
    let key = DataKey::Claimed(holder.clone());
    let claimed = env.storage().persistent().has(&key);
    if claimed {
        bump_persistent(env, &key);
    }
    claimed
}

pub fn mark_claimed(env: &Env, holder: &Address) {
    let key = DataKey::Claimed(holder.clone());
    env.storage().persistent().set(&key, &true);
    bump_persistent(env, &key);
}
