#![allow(dead_code)]

extern crate std;

use soroban_sdk::Address;

use crate::fixtures::TestPool;
use crate::types::RedemptionPreview;

/// INV-1: total supply equals the sum of every holder balance.
///
/// `holders` must list every address that has ever held shares.
pub fn assert_supply_conserved(pool: &TestPool, holders: &[Address]) {
    let sum: i128 = holders.iter().map(|h| pool.client.balance(h)).sum();
    let total = pool.client.total_supply();
    assert_eq!(
        total, sum,
        "INV-1 violated: total_supply {} != sum of balances {}",
        total, sum
    );
    assert_eq!(pool.client.pool_state().total_shares, total);
}

/// INV-2: the tracked pool balance is never negative and is fully backed by
/// tokens held in custody.
pub fn assert_pool_backed(pool: &TestPool) {
    let state = pool.client.pool_state();
    assert!(
        state.underlying_balance >= 0,
        "INV-2 violated: negative underlying balance {}",
        state.underlying_balance
    );
    let custody = pool.underlying_of(&pool.client.address);
    assert!(
        custody >= state.underlying_balance,
        "INV-2 violated: custody {} below tracked balance {}",
        custody,
        state.underlying_balance
    );
}

/// INV-3: a preview splits the requested shares exactly and never promises
/// more underlying than the pool holds.
pub fn assert_preview_consistent(pool: &TestPool, shares: i128, preview: &RedemptionPreview) {
    assert_eq!(
        preview.redeemable_shares + preview.forfeit_shares,
        shares,
        "INV-3 violated: {} + {} != {}",
        preview.redeemable_shares,
        preview.forfeit_shares,
        shares
    );
    assert!(preview.redeemable_shares >= 0 && preview.forfeit_shares >= 0);
    let underlying = pool.client.pool_state().underlying_balance;
    assert!(
        preview.withdrawable_underlying <= underlying,
        "INV-3 violated: withdrawable {} exceeds pool {}",
        preview.withdrawable_underlying,
        underlying
    );
}

/// Run every stateless pool invariant.
pub fn assert_all_pool_invariants(pool: &TestPool, holders: &[Address]) {
    assert_supply_conserved(pool, holders);
    assert_pool_backed(pool);
}
