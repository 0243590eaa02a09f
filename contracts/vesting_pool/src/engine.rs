//! # Redemption engine
//!
//! Converts the oracle's progress signal into a redeemable slice of a
//! holder's shares and pays out the matching slice of the pool.
//!
//! Each mutating call runs in three phases and writes nothing until the last:
//!
//! 1. **check**: lifecycle flags, fundraise window and balances
//!    ([`check_redeem`]).
//! 2. **compute**: a fresh oracle read feeding the storage-free [`compute`].
//! 3. **apply**: burn, debit the pool, transfer, publish ([`settle`]).
//!
//! ## Forfeiture
//!
//! A redeemer's unvested shares are burned with no payout. Their underlying
//! stays in `underlying_balance` while `total_shares` shrinks, so the
//! underlying-per-share of every remaining holder rises.

use soroban_sdk::{log, token, Address, Env};

use crate::events::{self, EmergencyWithdrawn, Redeemed};
use crate::types::{Amount, PoolSetup, PoolState, RedemptionPreview, VestingConfig};
use crate::{access, ledger, math, oracle, storage, Error};

/// Split `shares` into redeemable and forfeited parts and price the payout.
///
/// Reads no storage; `env` only hosts wide intermediate products.
pub fn compute(
    env: &Env,
    shares: Amount,
    amount_raised: Amount,
    config: &VestingConfig,
    pool: &PoolState,
) -> Result<RedemptionPreview, Error> {
    let redeemable_shares =
        math::redeemable_shares(env, shares, amount_raised, config.initial_goal_value)?;
    let forfeit_shares = shares - redeemable_shares;
    let withdrawable_underlying = math::pro_rata_underlying(
        env,
        pool.underlying_balance,
        redeemable_shares,
        pool.total_shares,
    )?;

    Ok(RedemptionPreview {
        withdrawable_underlying,
        redeemable_shares,
        forfeit_shares,
    })
}

fn require_config(env: &Env) -> Result<VestingConfig, Error> {
    storage::load_config(env).ok_or(Error::NoStartingValue)
}

/// Read-only preview for an arbitrary share amount.
pub fn preview_redeem(env: &Env, shares: Amount) -> Result<RedemptionPreview, Error> {
    let setup = access::require_setup(env)?;
    let config = require_config(env)?;
    let pool = storage::load_pool(env);

    if shares < 0 {
        return Err(Error::InvalidAmount);
    }
    if shares > pool.total_shares {
        return Err(Error::InsufficientFunds);
    }

    let raised = oracle::amount_raised(env, &setup.oracle)?;
    compute(env, shares, raised, &config, &pool)
}

/// Read-only preview of redeeming `holder`'s whole balance.
pub fn preview_user_redeem(env: &Env, holder: &Address) -> Result<RedemptionPreview, Error> {
    preview_redeem(env, ledger::balance(env, holder))
}

/// Current vested fraction, scaled by `math::SCALE`.
pub fn progress_fraction(env: &Env) -> Result<Amount, Error> {
    let setup = access::require_setup(env)?;
    let config = require_config(env)?;
    let raised = oracle::amount_raised(env, &setup.oracle)?;
    math::progress_fraction(env, raised, config.initial_goal_value)
}

/// Gate shared by `redeem` and `redeem_max`.
fn check_redeem(env: &Env) -> Result<(PoolSetup, VestingConfig), Error> {
    let setup = access::require_setup(env)?;
    if storage::load_flags(env).shutdown {
        return Err(Error::EmergencyShutdown);
    }
    let config = require_config(env)?;
    let now = env.ledger().timestamp();
    if config.raise_active(now) {
        log!(env, "raise not completed", now, config.fundraise_end_time);
        return Err(Error::RaiseNotCompleted);
    }
    Ok((setup, config))
}

/// Redeem `shares` of `holder`'s balance.
pub fn redeem(env: &Env, holder: &Address, shares: Amount) -> Result<RedemptionPreview, Error> {
    holder.require_auth();
    let (setup, config) = check_redeem(env)?;
    let mut pool = storage::load_pool(env);

    if shares <= 0 {
        return Err(Error::InvalidAmount);
    }
    let balance = ledger::balance(env, holder);
    if shares > balance || shares > pool.total_shares {
        log!(env, "redeem exceeds balance", shares, balance, pool.total_shares);
        return Err(Error::InsufficientFunds);
    }

    let raised = oracle::amount_raised(env, &setup.oracle)?;
    let preview = compute(env, shares, raised, &config, &pool)?;

    settle(
        env,
        &setup,
        &mut pool,
        holder,
        shares,
        preview.withdrawable_underlying,
        preview.forfeit_shares,
    )?;
    events::emit_redeemed(
        env,
        Redeemed {
            holder: holder.clone(),
            shares_burned: shares,
            withdrawable_underlying: preview.withdrawable_underlying,
            redeemable_shares: preview.redeemable_shares,
            forfeit_shares: preview.forfeit_shares,
            final_exit: false,
        },
    );
    Ok(preview)
}

/// Redeem `holder`'s entire balance.
///
/// When the holder owns every outstanding share the whole remaining pool is
/// paid out, so no rounding dust is left behind once supply reaches zero.
pub fn redeem_max(env: &Env, holder: &Address) -> Result<RedemptionPreview, Error> {
    holder.require_auth();
    let (setup, config) = check_redeem(env)?;
    let mut pool = storage::load_pool(env);

    let balance = ledger::balance(env, holder);
    if balance <= 0 || balance > pool.total_shares {
        return Err(Error::InsufficientFunds);
    }

    let raised = oracle::amount_raised(env, &setup.oracle)?;
    let mut preview = compute(env, balance, raised, &config, &pool)?;
    let final_exit = pool.total_shares - balance == 0;
    if final_exit {
        preview.withdrawable_underlying = pool.underlying_balance;
    }

    settle(
        env,
        &setup,
        &mut pool,
        holder,
        balance,
        preview.withdrawable_underlying,
        preview.forfeit_shares,
    )?;
    events::emit_redeemed(
        env,
        Redeemed {
            holder: holder.clone(),
            shares_burned: balance,
            withdrawable_underlying: preview.withdrawable_underlying,
            redeemable_shares: preview.redeemable_shares,
            forfeit_shares: preview.forfeit_shares,
            final_exit,
        },
    );
    Ok(preview)
}

/// Pay `holder` its full pro-rata slice while the pool is force-vested.
///
/// Ignores `shutdown` and the progress fraction. The holder's shares are
/// burned, so the same balance cannot be withdrawn twice.
pub fn emergency_withdraw(env: &Env, holder: &Address) -> Result<Amount, Error> {
    holder.require_auth();
    let setup = access::require_setup(env)?;
    if !storage::load_flags(env).force_vested {
        return Err(Error::NotForceVested);
    }
    let mut pool = storage::load_pool(env);

    let balance = ledger::balance(env, holder);
    if balance <= 0 || balance > pool.total_shares {
        return Err(Error::InsufficientFunds);
    }

    let payout = if pool.total_shares == balance {
        pool.underlying_balance
    } else {
        math::pro_rata_underlying(env, pool.underlying_balance, balance, pool.total_shares)?
    };

    settle(env, &setup, &mut pool, holder, balance, payout, 0)?;
    events::emit_emergency(
        env,
        EmergencyWithdrawn {
            holder: holder.clone(),
            shares_burned: balance,
            underlying: payout,
        },
    );
    Ok(payout)
}

/// Apply a computed redemption: burn, debit the pool, then pay out.
fn settle(
    env: &Env,
    setup: &PoolSetup,
    pool: &mut PoolState,
    holder: &Address,
    shares: Amount,
    payout: Amount,
    forfeit: Amount,
) -> Result<(), Error> {
    if payout < 0 || payout > pool.underlying_balance {
        return Err(Error::InsufficientFunds);
    }
    let forfeit_pool = pool
        .forfeit_pool
        .checked_add(forfeit)
        .ok_or(Error::ArithmeticOverflow)?;

    ledger::burn(env, pool, holder, shares)?;
    pool.underlying_balance -= payout;
    pool.forfeit_pool = forfeit_pool;
    storage::save_pool(env, pool);

    if payout > 0 {
        token::Client::new(env, &setup.underlying).transfer(
            &env.current_contract_address(),
            holder,
            &payout,
        );
    }
    Ok(())
}
