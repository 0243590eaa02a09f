//! # Events
//!
//! Every state change publishes one event. Topics are `(symbol, subject)`, plus
//! the recipient for transfers, and the data is a struct carrying the full
//! accounting delta, so an indexer can rebuild pool history without
//! re-deriving any math.
//!
//! | Topic       | Subject    | Data                  |
//! |-------------|------------|-----------------------|
//! | `params`    | owner      | [`VestingParamsSet`]  |
//! | `minted`    | recipient  | [`SharesMinted`]      |
//! | `deposited` | owner      | [`UnderlyingDeposited`] |
//! | `claimed`   | holder     | [`SharesClaimed`]     |
//! | `transfer`  | sender, recipient | [`SharesTransferred`] |
//! | `redeemed`  | holder     | [`Redeemed`]          |
//! | `emergency` | holder     | [`EmergencyWithdrawn`] |
//! | `shutdown`  | owner      | [`ShutdownChanged`]   |
//! | `recovered` | owner      | [`FundsRecovered`]    |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

use crate::types::{Amount, Timestamp};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingParamsSet {
    pub initial_goal_value: Amount,
    pub amount_raised: Amount,
    pub fundraise_start_time: Timestamp,
    pub fundraise_end_time: Timestamp,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SharesMinted {
    pub to: Address,
    pub shares: Amount,
    pub total_shares: Amount,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnderlyingDeposited {
    pub amount: Amount,
    pub value_of_deposit: Amount,
    pub balance_before: Amount,
    pub balance_after: Amount,
    pub value_ratio: Amount,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SharesClaimed {
    pub holder: Address,
    pub contribution: Amount,
    pub shares: Amount,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SharesTransferred {
    pub from: Address,
    pub to: Address,
    pub shares: Amount,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redeemed {
    pub holder: Address,
    pub shares_burned: Amount,
    pub withdrawable_underlying: Amount,
    pub redeemable_shares: Amount,
    pub forfeit_shares: Amount,
    /// Set when this redemption retired the last outstanding shares.
    pub final_exit: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawn {
    pub holder: Address,
    pub shares_burned: Amount,
    pub underlying: Amount,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShutdownChanged {
    pub shutdown: bool,
    pub force_vested: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsRecovered {
    pub token: Address,
    pub amount: Amount,
}

pub fn emit_params_set(env: &Env, owner: &Address, data: VestingParamsSet) {
    env.events()
        .publish((symbol_short!("params"), owner.clone()), data);
}

pub fn emit_minted(env: &Env, data: SharesMinted) {
    env.events()
        .publish((symbol_short!("minted"), data.to.clone()), data);
}

pub fn emit_deposited(env: &Env, owner: &Address, data: UnderlyingDeposited) {
    env.events()
        .publish((symbol_short!("deposited"), owner.clone()), data);
}

pub fn emit_claimed(env: &Env, data: SharesClaimed) {
    env.events()
        .publish((symbol_short!("claimed"), data.holder.clone()), data);
}

pub fn emit_transferred(env: &Env, data: SharesTransferred) {
    env.events()
        .publish(
            (symbol_short!("transfer"), data.from.clone(), data.to.clone()),
            data,
        );
}

pub fn emit_redeemed(env: &Env, data: Redeemed) {
    env.events()
        .publish((symbol_short!("redeemed"), data.holder.clone()), data);
}

pub fn emit_emergency(env: &Env, data: EmergencyWithdrawn) {
    env.events()
        .publish((symbol_short!("emergency"), data.holder.clone()), data);
}

pub fn emit_shutdown(env: &Env, owner: &Address, data: ShutdownChanged) {
    env.events()
        .publish((symbol_short!("shutdown"), owner.clone()), data);
}

pub fn emit_recovered(env: &Env, owner: &Address, data: FundsRecovered) {
    env.events()
        .publish((symbol_short!("recovered"), owner.clone()), data);
}
