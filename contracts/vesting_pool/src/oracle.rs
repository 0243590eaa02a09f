//! Progress oracle interface.
//!
//! The oracle is an external contract reporting a fundraise's goal, amount
//! raised and time window. The pool never caches its answers: every preview
//! and redemption re-reads the signal, since it is the vesting clock.
//!
//! Reads go through the generated `try_*` client methods so that a failing or
//! missing oracle surfaces as [`Error::OracleUnavailable`] instead of aborting
//! the invocation with an opaque host error.

use soroban_sdk::{contractclient, log, Address, Env, String};

use crate::types::{Amount, ProgressSnapshot, Timestamp};
use crate::Error;

/// Read-only surface the pool consumes.
#[allow(dead_code)]
#[contractclient(name = "ProgressOracleClient")]
pub trait ProgressOracle {
    fn get_goal_value(env: Env) -> i128;
    fn get_amount_raised(env: Env) -> i128;
    /// `goal - raised`, clamped at zero.
    fn get_remaining_value(env: Env) -> i128;
    fn get_start_time(env: Env) -> u64;
    fn get_end_time(env: Env) -> u64;
    fn get_user_contributions(env: Env, user: Address) -> i128;
}

/// Collapse a `try_*` client result into the pool's error space.
fn settle<T, C, E, I>(
    env: &Env,
    what: &str,
    res: Result<Result<T, C>, Result<E, I>>,
) -> Result<T, Error> {
    match res {
        Ok(Ok(value)) => Ok(value),
        _ => {
            log!(env, "oracle read failed", String::from_str(env, what));
            Err(Error::OracleUnavailable)
        }
    }
}

/// Current amount raised; negative readings are rejected.
pub fn amount_raised(env: &Env, oracle: &Address) -> Result<Amount, Error> {
    let client = ProgressOracleClient::new(env, oracle);
    let raised = settle(env, "amount_raised", client.try_get_amount_raised())?;
    if raised < 0 {
        log!(env, "oracle reported negative amount raised", raised);
        return Err(Error::InconsistentOracle);
    }
    Ok(raised)
}

/// Recorded contribution of `holder` to the raise.
pub fn user_contribution(env: &Env, oracle: &Address, holder: &Address) -> Result<Amount, Error> {
    let client = ProgressOracleClient::new(env, oracle);
    let contribution = settle(
        env,
        "user_contributions",
        client.try_get_user_contributions(holder),
    )?;
    if contribution < 0 {
        log!(env, "oracle reported negative contribution", contribution);
        return Err(Error::InconsistentOracle);
    }
    Ok(contribution)
}

/// Goal and window, as captured by `initialize_vesting_params`.
///
/// A snapshot without a positive goal, or whose window ends before it starts,
/// is inconsistent and cannot anchor vesting.
pub fn snapshot(env: &Env, oracle: &Address) -> Result<ProgressSnapshot, Error> {
    let client = ProgressOracleClient::new(env, oracle);
    let goal_value: Amount = settle(env, "goal_value", client.try_get_goal_value())?;
    let amount_raised = amount_raised(env, oracle)?;
    let start_time: Timestamp = settle(env, "start_time", client.try_get_start_time())?;
    let end_time: Timestamp = settle(env, "end_time", client.try_get_end_time())?;

    if goal_value <= 0 {
        log!(env, "oracle reported non-positive goal", goal_value);
        return Err(Error::InconsistentOracle);
    }
    if end_time != 0 && end_time < start_time {
        log!(env, "oracle window ends before it starts", start_time, end_time);
        return Err(Error::InconsistentOracle);
    }

    Ok(ProgressSnapshot {
        goal_value,
        amount_raised,
        start_time,
        end_time,
    })
}
