//! Share ledger.
//!
//! Minimal fungible bookkeeping over per-holder balances and
//! `PoolState::total_shares`. Each helper updates the holder entry and the
//! aggregate together, which keeps `total_shares == Σ balances`; the caller
//! persists the modified [`PoolState`] before returning from the invocation.

use soroban_sdk::{Address, Env};

use crate::storage;
use crate::types::{Amount, PoolState};
use crate::Error;

pub fn balance(env: &Env, holder: &Address) -> Amount {
    storage::load_balance(env, holder)
}

pub fn mint(env: &Env, pool: &mut PoolState, to: &Address, amount: Amount) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    let total = pool
        .total_shares
        .checked_add(amount)
        .ok_or(Error::ArithmeticOverflow)?;
    let balance = storage::load_balance(env, to)
        .checked_add(amount)
        .ok_or(Error::ArithmeticOverflow)?;

    storage::save_balance(env, to, balance);
    pool.total_shares = total;
    Ok(())
}

pub fn burn(env: &Env, pool: &mut PoolState, from: &Address, amount: Amount) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    let balance = storage::load_balance(env, from);
    if amount > balance || amount > pool.total_shares {
        return Err(Error::InsufficientFunds);
    }

    storage::save_balance(env, from, balance - amount);
    pool.total_shares -= amount;
    Ok(())
}

/// Move shares between holders; supply is unchanged.
pub fn transfer(env: &Env, from: &Address, to: &Address, amount: Amount) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    let from_balance = storage::load_balance(env, from);
    if amount > from_balance {
        return Err(Error::InsufficientFunds);
    }
    if from == to {
        return Ok(());
    }
    let to_balance = storage::load_balance(env, to)
        .checked_add(amount)
        .ok_or(Error::ArithmeticOverflow)?;

    storage::save_balance(env, from, from_balance - amount);
    storage::save_balance(env, to, to_balance);
    Ok(())
}
