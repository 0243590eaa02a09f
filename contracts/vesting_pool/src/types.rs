//! # Types
//!
//! Shared data structures used across all modules of the vesting pool.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! The pool is stored as separate ledger entries:
//!
//! - [`VestingConfig`]: captured once from the progress oracle; never mutated.
//! - [`PoolState`]: written on every deposit, claim, redemption and recovery.
//! - [`LifecycleFlags`]: written only by the owner.
//!
//! Per-holder share balances live in their own persistent entries (see
//! `storage.rs`) so that a redemption only touches the caller's balance.
//!
//! ### Lifecycle
//!
//! ```text
//! Uninitialised ──init──► Configured ──initialize_vesting_params──► Vesting
//!                                                                   │
//!                        shutdown ◄──── set_emergency_shutdown ─────┤
//!                        force-vested (latched) ◄───────────────────┘
//! ```

use soroban_sdk::{contracttype, Address};

/// Token-interface amount (underlying units or share units).
pub type Amount = i128;

/// Ledger timestamp in seconds. `0` means "no bound".
pub type Timestamp = u64;

/// Addresses wired in once at bootstrap.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolSetup {
    /// Owner allowed to configure, deposit, mint and toggle flags.
    pub owner: Address,
    /// Contract implementing the progress-oracle interface.
    pub oracle: Address,
    /// Token custodied by the pool.
    pub underlying: Address,
}

/// Write-once snapshot of the oracle's goal and fundraise window.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingConfig {
    /// Goal value at the moment the owner froze the parameters.
    pub initial_goal_value: Amount,
    pub fundraise_start_time: Timestamp,
    /// `0` when the raise is open-ended.
    pub fundraise_end_time: Timestamp,
}

impl VestingConfig {
    /// `true` while a time-boxed raise is still running at `now`.
    pub fn raise_active(&self, now: Timestamp) -> bool {
        self.fundraise_end_time != 0 && now < self.fundraise_end_time
    }
}

/// Mutable pool accounting.
///
/// `total_shares` always equals the sum of every holder balance;
/// forfeited value stays inside `underlying_balance`.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolState {
    pub total_shares: Amount,
    pub underlying_balance: Amount,
    /// Running total of forfeited shares (bookkeeping only).
    pub forfeit_pool: Amount,
    /// Shares per unit of deposit value, scaled by `math::SCALE`.
    pub value_ratio: Amount,
}

/// Owner-controlled emergency switches.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LifecycleFlags {
    /// Blocks `redeem`, `redeem_max` and `claim_shares`.
    pub shutdown: bool,
    /// Treats every holder as fully vested; one-way once set.
    pub force_vested: bool,
}

/// Result of a redemption preview.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RedemptionPreview {
    /// Underlying paid out for `redeemable_shares`.
    pub withdrawable_underlying: Amount,
    pub redeemable_shares: Amount,
    /// Shares burned without payout.
    pub forfeit_shares: Amount,
}

/// Raw oracle reading, taken fresh for every query.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgressSnapshot {
    pub goal_value: Amount,
    pub amount_raised: Amount,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}
