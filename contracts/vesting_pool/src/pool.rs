//! Pool account and share issuance.
//!
//! Owns the write-once vesting parameters, custody of the underlying asset,
//! and the two ways shares come into existence: direct owner mints and the
//! one-time holder claim sized by the holder's recorded contribution.

use soroban_sdk::{log, token, Address, Env};

use crate::events::{
    self, FundsRecovered, SharesClaimed, SharesMinted, SharesTransferred, UnderlyingDeposited,
    VestingParamsSet,
};
use crate::types::{Amount, VestingConfig};
use crate::{access, ledger, math, oracle, storage, Error};

// ─────────────────────────────────────────────────────────
// Vesting parameters
// ─────────────────────────────────────────────────────────

/// Freeze the oracle's goal and window as the vesting reference point.
pub fn initialize_vesting_params(env: &Env, caller: &Address) -> Result<VestingConfig, Error> {
    let setup = access::require_owner(env, caller)?;
    if storage::load_config(env).is_some() {
        return Err(Error::AlreadyInitialized);
    }

    let snapshot = oracle::snapshot(env, &setup.oracle)?;
    let config = VestingConfig {
        initial_goal_value: snapshot.goal_value,
        fundraise_start_time: snapshot.start_time,
        fundraise_end_time: snapshot.end_time,
    };
    storage::save_config(env, &config);

    events::emit_params_set(
        env,
        caller,
        VestingParamsSet {
            initial_goal_value: config.initial_goal_value,
            amount_raised: snapshot.amount_raised,
            fundraise_start_time: config.fundraise_start_time,
            fundraise_end_time: config.fundraise_end_time,
        },
    );
    Ok(config)
}

// ─────────────────────────────────────────────────────────
// Custody
// ─────────────────────────────────────────────────────────

/// Move `amount` of underlying from the owner into the pool.
pub fn deposit_underlying(
    env: &Env,
    caller: &Address,
    amount: Amount,
    value_of_deposit: Amount,
) -> Result<(), Error> {
    let setup = access::require_owner(env, caller)?;
    if storage::load_config(env).is_none() {
        return Err(Error::NoStartingValue);
    }
    if amount <= 0 || value_of_deposit <= 0 {
        return Err(Error::InvalidAmount);
    }

    let mut pool = storage::load_pool(env);
    let balance_before = pool.underlying_balance;
    let balance_after = balance_before
        .checked_add(amount)
        .ok_or(Error::ArithmeticOverflow)?;
    let value_ratio = math::value_ratio(env, pool.total_shares, value_of_deposit)?;

    token::Client::new(env, &setup.underlying).transfer(
        caller,
        &env.current_contract_address(),
        &amount,
    );

    pool.underlying_balance = balance_after;
    pool.value_ratio = value_ratio;
    storage::save_pool(env, &pool);

    events::emit_deposited(
        env,
        caller,
        UnderlyingDeposited {
            amount,
            value_of_deposit,
            balance_before,
            balance_after,
            value_ratio,
        },
    );
    Ok(())
}

/// Shares that `value` maps to at the last deposit's value ratio.
pub fn quote_shares(env: &Env, value: Amount) -> Result<Amount, Error> {
    if value < 0 {
        return Err(Error::InvalidAmount);
    }
    let pool = storage::load_pool(env);
    math::mul_div_floor(env, value, pool.value_ratio, math::SCALE)
}

/// Emergency escape hatch: send the pool's holdings of `asset` to the owner.
///
/// For the underlying token only the tracked `underlying_balance` is drained;
/// for any other token the contract's entire balance is. Outstanding shares
/// are left untouched and become claims on an empty pool.
pub fn recover_asset(env: &Env, caller: &Address, asset: &Address) -> Result<Amount, Error> {
    let setup = access::require_owner(env, caller)?;
    let client = token::Client::new(env, asset);
    let contract = env.current_contract_address();

    let amount = if asset == &setup.underlying {
        let mut pool = storage::load_pool(env);
        let drained = pool.underlying_balance;
        pool.underlying_balance = 0;
        storage::save_pool(env, &pool);
        drained
    } else {
        client.balance(&contract)
    };

    if amount > 0 {
        client.transfer(&contract, caller, &amount);
    }
    log!(env, "asset recovered", amount);
    events::emit_recovered(
        env,
        caller,
        FundsRecovered {
            token: asset.clone(),
            amount,
        },
    );
    Ok(amount)
}

// ─────────────────────────────────────────────────────────
// Share issuance
// ─────────────────────────────────────────────────────────

/// Owner-only direct issuance, bypassing deposit accounting.
pub fn mint_shares(env: &Env, caller: &Address, to: &Address, shares: Amount) -> Result<(), Error> {
    access::require_owner(env, caller)?;
    let mut pool = storage::load_pool(env);
    ledger::mint(env, &mut pool, to, shares)?;
    storage::save_pool(env, &pool);

    events::emit_minted(
        env,
        SharesMinted {
            to: to.clone(),
            shares,
            total_shares: pool.total_shares,
        },
    );
    Ok(())
}

/// One-time self-service claim sized by the holder's share of the raise.
///
/// `shares = contribution * underlying_balance / amount_raised`, i.e. share
/// units 1:1 with the underlying the contribution entitles the holder to.
pub fn claim_shares(env: &Env, holder: &Address) -> Result<Amount, Error> {
    holder.require_auth();
    let setup = access::require_setup(env)?;
    if storage::load_flags(env).shutdown {
        return Err(Error::EmergencyShutdown);
    }
    let config = storage::load_config(env).ok_or(Error::NoStartingValue)?;
    let now = env.ledger().timestamp();
    if config.raise_active(now) {
        log!(env, "raise not completed", now, config.fundraise_end_time);
        return Err(Error::RaiseNotCompleted);
    }
    if ledger::balance(env, holder) != 0 || storage::is_claimed(env, holder) {
        return Err(Error::AlreadyClaimed);
    }

    let contribution = oracle::user_contribution(env, &setup.oracle, holder)?;
    if contribution == 0 {
        return Err(Error::NoContribution);
    }
    let total_contributions = oracle::amount_raised(env, &setup.oracle)?;
    if contribution > total_contributions {
        log!(env, "contribution exceeds total raised", contribution, total_contributions);
        return Err(Error::InconsistentOracle);
    }

    let mut pool = storage::load_pool(env);
    let shares = math::mul_div_floor(env, contribution, pool.underlying_balance, total_contributions)?;
    if shares == 0 {
        return Err(Error::InsufficientFunds);
    }
    ledger::mint(env, &mut pool, holder, shares)?;
    storage::mark_claimed(env, holder);
    storage::save_pool(env, &pool);

    events::emit_claimed(
        env,
        SharesClaimed {
            holder: holder.clone(),
            contribution,
            shares,
        },
    );
    Ok(shares)
}

pub fn transfer_shares(env: &Env, from: &Address, to: &Address, shares: Amount) -> Result<(), Error> {
    from.require_auth();
    access::require_setup(env)?;
    ledger::transfer(env, from, to, shares)?;

    events::emit_transferred(
        env,
        SharesTransferred {
            from: from.clone(),
            to: to.clone(),
            shares,
        },
    );
    Ok(())
}
