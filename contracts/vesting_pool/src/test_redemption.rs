extern crate std;

use soroban_sdk::{testutils::Address as _, Address};

use crate::fixtures::{setup, setup_configured, TestPool};
use crate::invariants::{
    assert_all_pool_invariants, assert_pool_backed, assert_preview_consistent,
};
use crate::{Error, RedemptionPreview, SCALE};

fn preview(withdrawable: i128, redeemable: i128, forfeit: i128) -> RedemptionPreview {
    RedemptionPreview {
        withdrawable_underlying: withdrawable,
        redeemable_shares: redeemable,
        forfeit_shares: forfeit,
    }
}

/// Two holders with 50 shares each over a pool of `underlying`.
fn two_holder_pool(underlying: i128, raised: i128) -> (TestPool, Address, Address) {
    let pool = setup_configured(1_000, raised);
    let a = pool.holder_with_shares(50);
    let b = pool.holder_with_shares(50);
    pool.fund(underlying);
    (pool, a, b)
}

// ─────────────────────────────────────────────────────────
// Preview
// ─────────────────────────────────────────────────────────

#[test]
fn test_nothing_vested_before_any_progress() {
    let pool = setup_configured(1_000, 0);
    pool.holder_with_shares(100);
    pool.fund(500);

    let p = pool.client.preview_redeem(&100);
    assert_eq!(p, preview(0, 0, 100));
    assert_preview_consistent(&pool, 100, &p);
}

#[test]
fn test_everything_vested_at_goal() {
    let pool = setup_configured(1_000, 1_000);
    pool.holder_with_shares(100);
    pool.fund(500);

    let p = pool.client.preview_redeem(&100);
    assert_eq!(p, preview(500, 100, 0));
    assert_preview_consistent(&pool, 100, &p);
}

#[test]
fn test_progress_beyond_goal_is_capped() {
    let pool = setup_configured(1_000, 4_000);
    pool.holder_with_shares(100);
    pool.fund(500);

    assert_eq!(pool.client.preview_redeem(&40), preview(200, 40, 0));
    assert_eq!(pool.client.progress_fraction(), SCALE);
}

#[test]
fn test_redeemable_fraction_rises_with_progress() {
    let pool = setup_configured(1_000, 0);
    pool.holder_with_shares(1_000);
    pool.fund(1_000);

    let mut last = -1;
    for raised in [0, 100, 250, 499, 500, 900, 1_000] {
        pool.set_raised(raised);
        let p = pool.client.preview_redeem(&1_000);
        assert!(p.redeemable_shares > last);
        assert_eq!(p.redeemable_shares, raised);
        last = p.redeemable_shares;
    }
    pool.set_raised(250);
    assert_eq!(pool.client.progress_fraction(), SCALE / 4);
}

#[test]
fn test_small_holder_is_not_truncated_to_zero() {
    let pool = setup_configured(1_000, 1_000);
    let small = pool.holder_with_shares(1);
    pool.holder_with_shares(999);
    pool.fund(5_000);

    assert_eq!(pool.client.preview_user_redeem(&small), preview(5, 1, 0));
}

#[test]
fn test_preview_is_idempotent_and_read_only() {
    let (pool, a, _) = two_holder_pool(100, 500);
    let state = pool.client.pool_state();

    let first = pool.client.preview_redeem(&50);
    let second = pool.client.preview_redeem(&50);
    assert_eq!(first, second);
    assert_eq!(pool.client.preview_user_redeem(&a), first);
    assert_eq!(pool.client.pool_state(), state);
    assert_eq!(pool.client.balance(&a), 50);
}

#[test]
fn test_preview_rereads_oracle() {
    let (pool, a, _) = two_holder_pool(100, 500);
    assert_eq!(pool.client.preview_user_redeem(&a), preview(25, 25, 25));

    pool.set_raised(800);
    assert_eq!(pool.client.preview_user_redeem(&a), preview(40, 40, 10));
}

#[test]
fn test_preview_rejections() {
    let pool = setup();
    assert_eq!(pool.client.try_preview_redeem(&1), Err(Ok(Error::NoStartingValue)));

    let pool = setup_configured(1_000, 0);
    pool.holder_with_shares(10);
    assert_eq!(
        pool.client.try_preview_redeem(&11),
        Err(Ok(Error::InsufficientFunds))
    );
    assert_eq!(pool.client.try_preview_redeem(&-1), Err(Ok(Error::InvalidAmount)));
    assert_eq!(pool.client.preview_redeem(&0), preview(0, 0, 0));
}

// ─────────────────────────────────────────────────────────
// Redeem
// ─────────────────────────────────────────────────────────

#[test]
fn test_forfeiture_raises_value_of_remaining_shares() {
    let (pool, a, b) = two_holder_pool(100, 500);

    let p = pool.client.redeem(&a, &50);
    assert_eq!(p, preview(25, 25, 25));
    assert_eq!(pool.underlying_of(&a), 25);
    assert_eq!(pool.client.balance(&a), 0);

    let state = pool.client.pool_state();
    assert_eq!(state.total_shares, 50);
    assert_eq!(state.underlying_balance, 75);
    assert_eq!(state.forfeit_pool, 25);
    // 75 / 50 > 100 / 100
    assert!(state.underlying_balance * 100 > 100 * state.total_shares);

    assert_all_pool_invariants(&pool, &[a, b]);
}

#[test]
fn test_forfeiture_benefits_later_redeemer() {
    // A redeems at half progress and forfeits.
    let (forfeiting, a, b) = two_holder_pool(1_000, 500);
    forfeiting.client.redeem(&a, &50);
    let with_forfeit = forfeiting.client.preview_user_redeem(&b);

    // A redeems at full progress and forfeits nothing; B is then measured at
    // the same half progress.
    let (clean, a2, b2) = two_holder_pool(1_000, 1_000);
    let p = clean.client.redeem(&a2, &50);
    assert_eq!(p.forfeit_shares, 0);
    clean.set_raised(500);
    let without_forfeit = clean.client.preview_user_redeem(&b2);

    assert_eq!(with_forfeit, preview(375, 25, 25));
    assert_eq!(without_forfeit, preview(250, 25, 25));
    assert!(with_forfeit.withdrawable_underlying >= without_forfeit.withdrawable_underlying);
}

#[test]
fn test_redeem_blocked_during_timeboxed_raise() {
    let pool = setup();
    pool.oracle.set_progress(&1_000, &1_000);
    pool.oracle.set_window(&100, &2_000);
    pool.client.initialize_vesting_params(&pool.owner);
    let holder = pool.holder_with_shares(10);
    pool.fund(10);

    pool.set_time(1_999);
    assert_eq!(
        pool.client.try_redeem(&holder, &10),
        Err(Ok(Error::RaiseNotCompleted))
    );
    assert_eq!(
        pool.client.try_redeem_max(&holder),
        Err(Ok(Error::RaiseNotCompleted))
    );

    pool.set_time(2_000);
    assert_eq!(pool.client.redeem(&holder, &10), preview(10, 10, 0));
}

#[test]
fn test_open_ended_raise_has_no_time_gate() {
    let pool = setup_configured(1_000, 1_000);
    let holder = pool.holder_with_shares(10);
    pool.fund(10);
    pool.set_time(0);
    assert_eq!(pool.client.redeem(&holder, &4), preview(4, 4, 0));
}

#[test]
fn test_redeem_rejects_bad_amounts() {
    let (pool, a, b) = two_holder_pool(100, 500);

    assert_eq!(pool.client.try_redeem(&a, &51), Err(Ok(Error::InsufficientFunds)));
    assert_eq!(pool.client.try_redeem(&a, &0), Err(Ok(Error::InvalidAmount)));
    let nobody = Address::generate(&pool.env);
    assert_eq!(pool.client.try_redeem_max(&nobody), Err(Ok(Error::InsufficientFunds)));

    assert_eq!(pool.client.balance(&a), 50);
    assert_eq!(pool.client.pool_state().underlying_balance, 100);
    assert_all_pool_invariants(&pool, &[a, b]);
}

#[test]
fn test_failed_oracle_read_leaves_pool_untouched() {
    let (pool, a, b) = two_holder_pool(100, 500);
    let state = pool.client.pool_state();
    pool.oracle.set_broken(&true);

    assert_eq!(pool.client.try_redeem(&a, &10), Err(Ok(Error::OracleUnavailable)));
    assert_eq!(pool.client.try_preview_redeem(&10), Err(Ok(Error::OracleUnavailable)));
    assert_eq!(pool.client.pool_state(), state);
    assert_eq!(pool.client.balance(&a), 50);
    assert_eq!(pool.underlying_of(&a), 0);
    assert_all_pool_invariants(&pool, &[a, b]);
}

// ─────────────────────────────────────────────────────────
// Redeem max
// ─────────────────────────────────────────────────────────

#[test]
fn test_last_redeemer_drains_pool() {
    let pool = setup_configured(3_000, 1_000);
    let a = pool.holder_with_shares(33);
    let b = pool.holder_with_shares(33);
    let c = pool.holder_with_shares(34);
    pool.fund(1_000);

    // Non-final exits behave exactly like redeem(balance).
    assert_eq!(pool.client.redeem_max(&a), preview(110, 11, 22));
    assert_eq!(pool.client.redeem_max(&b), preview(146, 11, 22));
    assert_all_pool_invariants(&pool, &[a.clone(), b.clone(), c.clone()]);

    let last = pool.client.redeem_max(&c);
    assert_eq!(last.withdrawable_underlying, 744);

    let state = pool.client.pool_state();
    assert_eq!(state.total_shares, 0);
    assert_eq!(state.underlying_balance, 0);
    assert_eq!(pool.underlying_of(&pool.client.address), 0);
    assert_eq!(
        pool.underlying_of(&a) + pool.underlying_of(&b) + pool.underlying_of(&c),
        1_000
    );
}

/// 1e20 units: 100 whole tokens at 18 decimals.
const LARGE: i128 = 100_000_000_000_000_000_000;

#[test]
fn test_large_pool_redeems_in_full() {
    let pool = setup_configured(1_000, 1_000);
    let a = pool.holder_with_shares(LARGE);
    pool.fund(LARGE);

    assert_eq!(pool.client.preview_redeem(&LARGE), preview(LARGE, LARGE, 0));
    assert_eq!(pool.client.redeem(&a, &LARGE), preview(LARGE, LARGE, 0));
    assert_eq!(pool.underlying_of(&a), LARGE);

    let state = pool.client.pool_state();
    assert_eq!(state.total_shares, 0);
    assert_eq!(state.underlying_balance, 0);
}

#[test]
fn test_large_pool_forfeits_and_drains() {
    let pool = setup_configured(1_000, 500);
    let a = pool.holder_with_shares(LARGE);
    let b = pool.holder_with_shares(LARGE);
    pool.fund(2 * LARGE);
    assert_eq!(pool.client.pool_state().value_ratio, SCALE);

    let half = LARGE / 2;
    assert_eq!(pool.client.redeem(&a, &LARGE), preview(half, half, half));

    let last = pool.client.redeem_max(&b);
    assert_eq!(last, preview(3 * half, half, half));
    assert_eq!(pool.underlying_of(&b), 3 * half);
    assert_eq!(pool.client.pool_state().underlying_balance, 0);
    assert_all_pool_invariants(&pool, &[a, b]);
}

#[test]
fn test_shutdown_blocks_redemption() {
    let (pool, a, _) = two_holder_pool(100, 1_000);
    pool.client.set_emergency_shutdown(&pool.owner, &true, &false);

    assert_eq!(pool.client.try_redeem(&a, &10), Err(Ok(Error::EmergencyShutdown)));
    assert_eq!(pool.client.try_redeem_max(&a), Err(Ok(Error::EmergencyShutdown)));
    // Gated only by force-vest, not by shutdown.
    assert_eq!(
        pool.client.try_emergency_withdraw_underlying(&a),
        Err(Ok(Error::NotForceVested))
    );

    pool.client.set_emergency_shutdown(&pool.owner, &false, &false);
    assert_eq!(pool.client.redeem(&a, &10), preview(10, 10, 0));
}

// ─────────────────────────────────────────────────────────
// Force-vested withdrawals
// ─────────────────────────────────────────────────────────

#[test]
fn test_emergency_withdraw_pays_full_pro_rata_once() {
    let pool = setup_configured(1_000, 0);
    let a = pool.holder_with_shares(30);
    let b = pool.holder_with_shares(70);
    pool.fund(1_000);
    pool.client.set_emergency_shutdown(&pool.owner, &true, &true);

    // Nothing is vested, yet force-vest pays the full share.
    assert_eq!(pool.client.emergency_withdraw_underlying(&a), 300);
    assert_eq!(pool.client.balance(&a), 0);
    assert_eq!(
        pool.client.try_emergency_withdraw_underlying(&a),
        Err(Ok(Error::InsufficientFunds))
    );

    assert_eq!(pool.client.emergency_withdraw_underlying(&b), 700);
    let state = pool.client.pool_state();
    assert_eq!(state.total_shares, 0);
    assert_eq!(state.underlying_balance, 0);
    assert_eq!(state.forfeit_pool, 0);
    assert_pool_backed(&pool);
}

#[test]
fn test_emergency_withdraw_last_holder_takes_dust() {
    let pool = setup_configured(1_000, 0);
    let a = pool.holder_with_shares(1);
    let b = pool.holder_with_shares(2);
    pool.fund(100);
    pool.client.set_emergency_shutdown(&pool.owner, &false, &true);

    assert_eq!(pool.client.emergency_withdraw_underlying(&a), 33);
    assert_eq!(pool.client.emergency_withdraw_underlying(&b), 67);
    assert_eq!(pool.underlying_of(&pool.client.address), 0);
}

// ─────────────────────────────────────────────────────────
// Invariants across a mixed sequence
// ─────────────────────────────────────────────────────────

#[test]
fn test_invariants_hold_across_mixed_operations() {
    let pool = setup_configured(1_000, 1_000);
    pool.fund(3_000);

    let alice = Address::generate(&pool.env);
    let bob = Address::generate(&pool.env);
    let carol = pool.holder_with_shares(500);
    pool.oracle.set_contribution(&alice, &400);
    pool.oracle.set_contribution(&bob, &600);
    let holders = [alice.clone(), bob.clone(), carol.clone()];

    pool.client.claim_shares(&alice);
    assert_all_pool_invariants(&pool, &holders);
    pool.client.claim_shares(&bob);
    assert_all_pool_invariants(&pool, &holders);

    pool.set_raised(300);
    pool.client.transfer(&carol, &alice, &125);
    assert_all_pool_invariants(&pool, &holders);

    for (holder, shares) in [(&alice, 77), (&bob, 1_001), (&carol, 3)] {
        let p = pool.client.preview_redeem(&shares);
        assert_preview_consistent(&pool, shares, &p);
        pool.client.redeem(holder, &shares);
        assert_all_pool_invariants(&pool, &holders);
    }

    pool.set_raised(700);
    pool.client.redeem_max(&bob);
    pool.client.redeem_max(&carol);
    assert_all_pool_invariants(&pool, &holders);
    pool.client.redeem_max(&alice);
    assert_all_pool_invariants(&pool, &holders);

    let state = pool.client.pool_state();
    assert_eq!(state.total_shares, 0);
    assert_eq!(state.underlying_balance, 0);
}
