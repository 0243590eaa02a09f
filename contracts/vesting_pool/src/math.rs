//! Fixed-point helpers for the redemption math.
//!
//! Every helper multiplies before dividing and truncates exactly once, so a
//! holder with a small fraction of supply is never rounded down to zero by an
//! intermediate step. Products that do not fit in `i128` are carried in a
//! host [`I256`]; only a final result outside `i128` surfaces as
//! [`Error::ArithmeticOverflow`].

use soroban_sdk::{Env, I256};

use crate::types::Amount;
use crate::Error;

/// Fixed-point scale (1.0 == 1e18).
pub const SCALE: Amount = 1_000_000_000_000_000_000;

/// `floor(a * b / denominator)` with a single truncation.
///
/// Inputs are expected to be non-negative; a zero denominator yields zero
/// rather than trapping, which covers the fully drained pool.
pub fn mul_div_floor(
    env: &Env,
    a: Amount,
    b: Amount,
    denominator: Amount,
) -> Result<Amount, Error> {
    if denominator == 0 {
        return Ok(0);
    }
    match a.checked_mul(b) {
        Some(product) => product
            .checked_div(denominator)
            .ok_or(Error::ArithmeticOverflow),
        // The product of two i128 always fits in 256 bits.
        None => I256::from_i128(env, a)
            .mul(&I256::from_i128(env, b))
            .div(&I256::from_i128(env, denominator))
            .to_i128()
            .ok_or(Error::ArithmeticOverflow),
    }
}

/// Clamp the oracle's raised amount into `[0, goal]`.
pub fn clamp_progress(amount_raised: Amount, goal: Amount) -> Amount {
    amount_raised.max(0).min(goal)
}

/// Vested fraction of the goal, scaled by [`SCALE`].
///
/// Rises from `0` (nothing raised) to `SCALE` (goal reached or exceeded).
pub fn progress_fraction(env: &Env, amount_raised: Amount, goal: Amount) -> Result<Amount, Error> {
    if goal <= 0 {
        return Err(Error::InconsistentOracle);
    }
    mul_div_floor(env, clamp_progress(amount_raised, goal), SCALE, goal)
}

/// Portion of `shares` that is currently redeemable.
///
/// Computed straight from the raised/goal pair rather than from the
/// truncated [`progress_fraction`], so the result is floored only once.
pub fn redeemable_shares(
    env: &Env,
    shares: Amount,
    amount_raised: Amount,
    goal: Amount,
) -> Result<Amount, Error> {
    if goal <= 0 {
        return Err(Error::InconsistentOracle);
    }
    mul_div_floor(env, shares, clamp_progress(amount_raised, goal), goal)
}

/// Pro-rata slice of the pool backing `shares` out of `total_shares`.
pub fn pro_rata_underlying(
    env: &Env,
    underlying_balance: Amount,
    shares: Amount,
    total_shares: Amount,
) -> Result<Amount, Error> {
    let amount = mul_div_floor(env, underlying_balance, shares, total_shares)?;
    // shares <= total_shares keeps this within the pool; clamp regardless.
    Ok(amount.min(underlying_balance))
}

/// `total_shares / value_of_deposit`, scaled by [`SCALE`].
pub fn value_ratio(env: &Env, total_shares: Amount, value_of_deposit: Amount) -> Result<Amount, Error> {
    if value_of_deposit <= 0 {
        return Err(Error::InvalidAmount);
    }
    mul_div_floor(env, total_shares, SCALE, value_of_deposit)
}
