// contracts/vesting_pool/src/lib.rs

//! # Vesting Pool Contract
//!
//! A pooled underlying asset released to share holders in step with an
//! external fundraise's progress. Holders who redeem before the goal is
//! reached forfeit their unvested shares; the underlying behind those shares
//! stays in the pool and raises the per-share value for everyone who remains.
//!
//! | Phase        | Entry Point(s)                                          |
//! |--------------|---------------------------------------------------------|
//! | Bootstrap    | [`VestingPool::init`], `initialize_vesting_params`      |
//! | Funding      | `deposit_underlying`, `mint`, `claim_shares`            |
//! | Redemption   | `redeem`, `redeem_max`, `emergency_withdraw_underlying` |
//! | Emergency    | `set_emergency_shutdown`, `recover_asset`               |
//! | Queries      | `preview_redeem`, `preview_user_redeem`, `balance`, …   |
//!
//! ## Architecture
//!
//! Authorization lives in [`access`], storage in [`storage`], the redemption
//! math in [`engine`] and [`math`]. This file contains **only** the public
//! entry points.
//!
//! Every entry point checks before it writes and returns a typed [`Error`].
//! A failed invocation (including a failed token transfer) is rolled back by
//! the host as a whole, so the pool never holds a partial update.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Env};

mod access;
mod engine;
mod events;
mod ledger;
mod lifecycle;
mod math;
pub mod oracle;
mod pool;
mod storage;
mod types;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_redemption;

pub use events::{
    EmergencyWithdrawn, FundsRecovered, Redeemed, SharesClaimed, SharesMinted, SharesTransferred,
    ShutdownChanged, UnderlyingDeposited, VestingParamsSet,
};
pub use math::SCALE;
pub use oracle::ProgressOracleClient;
pub use types::{Amount, LifecycleFlags, PoolSetup, PoolState, RedemptionPreview, VestingConfig};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // Authorization
    NotAuthorized         = 1,
    // Lifecycle
    AlreadyInitialized    = 2,
    NotInitialized        = 3,
    NoStartingValue       = 4,
    RaiseNotCompleted     = 5,
    EmergencyShutdown     = 6,
    NotForceVested        = 7,
    ForceVestLatched      = 8,
    ArithmeticOverflow    = 9,
    // Balances
    InsufficientFunds     = 10,
    AlreadyClaimed        = 11,
    InvalidAmount         = 12,
    NoContribution        = 13,
    // External dependencies
    OracleUnavailable     = 14,
    InconsistentOracle    = 15,
}

#[contract]
pub struct VestingPool;

#[contractimpl]
impl VestingPool {
    // ─────────────────────────────────────────────────────────
    // Bootstrap
    // ─────────────────────────────────────────────────────────

    /// Wire the owner, progress oracle and underlying token.
    ///
    /// Must be called exactly once after deployment; later calls fail with
    /// `Error::AlreadyInitialized`.
    pub fn init(env: Env, owner: Address, oracle: Address, underlying: Address) -> Result<(), Error> {
        owner.require_auth();
        if storage::has_setup(&env) {
            return Err(Error::AlreadyInitialized);
        }
        storage::save_setup(
            &env,
            &PoolSetup {
                owner,
                oracle,
                underlying,
            },
        );
        Ok(())
    }

    /// Freeze the oracle's current goal and fundraise window.
    ///
    /// Owner only, once. A second call fails with `Error::AlreadyInitialized`
    /// whatever the oracle reports.
    pub fn initialize_vesting_params(env: Env, caller: Address) -> Result<VestingConfig, Error> {
        pool::initialize_vesting_params(&env, &caller)
    }

    // ─────────────────────────────────────────────────────────
    // Owner controls
    // ─────────────────────────────────────────────────────────

    /// Issue `shares` to `to` without any deposit accounting.
    pub fn mint(env: Env, caller: Address, to: Address, shares: i128) -> Result<(), Error> {
        pool::mint_shares(&env, &caller, &to, shares)
    }

    /// Deposit `amount` of underlying and reset the value ratio to
    /// `total_shares / value_of_deposit`.
    pub fn deposit_underlying(
        env: Env,
        caller: Address,
        amount: i128,
        value_of_deposit: i128,
    ) -> Result<(), Error> {
        pool::deposit_underlying(&env, &caller, amount, value_of_deposit)
    }

    /// Set the shutdown and force-vest switches. Force-vest cannot be cleared.
    pub fn set_emergency_shutdown(
        env: Env,
        caller: Address,
        shutdown: bool,
        force_vested: bool,
    ) -> Result<LifecycleFlags, Error> {
        lifecycle::set_emergency_shutdown(&env, &caller, shutdown, force_vested)
    }

    /// Send the pool's holdings of `token` to the owner.
    ///
    /// Trust-relaxing emergency action: outstanding shares are **not** burned
    /// and lose their backing if `token` is the underlying.
    pub fn recover_asset(env: Env, caller: Address, token: Address) -> Result<i128, Error> {
        pool::recover_asset(&env, &caller, &token)
    }

    // ─────────────────────────────────────────────────────────
    // Holder operations
    // ─────────────────────────────────────────────────────────

    /// Claim shares pro rata to the holder's recorded contribution.
    pub fn claim_shares(env: Env, holder: Address) -> Result<i128, Error> {
        pool::claim_shares(&env, &holder)
    }

    pub fn transfer(env: Env, from: Address, to: Address, shares: i128) -> Result<(), Error> {
        pool::transfer_shares(&env, &from, &to, shares)
    }

    /// Burn `shares`, receiving the vested part's slice of the pool.
    pub fn redeem(env: Env, holder: Address, shares: i128) -> Result<RedemptionPreview, Error> {
        engine::redeem(&env, &holder, shares)
    }

    /// Redeem the holder's whole balance; the last holder out drains the pool.
    pub fn redeem_max(env: Env, holder: Address) -> Result<RedemptionPreview, Error> {
        engine::redeem_max(&env, &holder)
    }

    /// While force-vested, burn the holder's shares for their full pro-rata
    /// underlying.
    pub fn emergency_withdraw_underlying(env: Env, holder: Address) -> Result<i128, Error> {
        engine::emergency_withdraw(&env, &holder)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn preview_redeem(env: Env, shares: i128) -> Result<RedemptionPreview, Error> {
        engine::preview_redeem(&env, shares)
    }

    pub fn preview_user_redeem(env: Env, holder: Address) -> Result<RedemptionPreview, Error> {
        engine::preview_user_redeem(&env, &holder)
    }

    /// Vested fraction scaled by [`SCALE`].
    pub fn progress_fraction(env: Env) -> Result<i128, Error> {
        engine::progress_fraction(&env)
    }

    pub fn quote_shares(env: Env, value: i128) -> Result<i128, Error> {
        pool::quote_shares(&env, value)
    }

    pub fn balance(env: Env, holder: Address) -> i128 {
        ledger::balance(&env, &holder)
    }

    pub fn total_supply(env: Env) -> i128 {
        storage::load_pool(&env).total_shares
    }

    pub fn pool_state(env: Env) -> PoolState {
        storage::load_pool(&env)
    }

    pub fn vesting_config(env: Env) -> Option<VestingConfig> {
        storage::load_config(&env)
    }

    pub fn lifecycle(env: Env) -> LifecycleFlags {
        storage::load_flags(&env)
    }

    pub fn is_claimed(env: Env, holder: Address) -> bool {
        storage::is_claimed(&env, &holder)
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        access::require_setup(&env).map(|setup| setup.owner)
    }
}
