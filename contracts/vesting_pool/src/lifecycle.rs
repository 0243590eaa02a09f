//! Lifecycle guard.
//!
//! Two owner-controlled switches:
//!
//! - `shutdown` halts `redeem`, `redeem_max` and `claim_shares`. Reversible.
//! - `force_vested` opens `emergency_withdraw_underlying`. Once set it stays
//!   set: clearing it after some holders have withdrawn at 100% would reprice
//!   the rest of the pool.

use soroban_sdk::{Address, Env};

use crate::events::{self, ShutdownChanged};
use crate::types::LifecycleFlags;
use crate::{access, storage, Error};

pub fn set_emergency_shutdown(
    env: &Env,
    caller: &Address,
    shutdown: bool,
    force_vested: bool,
) -> Result<LifecycleFlags, Error> {
    access::require_owner(env, caller)?;
    let current = storage::load_flags(env);
    if current.force_vested && !force_vested {
        return Err(Error::ForceVestLatched);
    }

    let flags = LifecycleFlags {
        shutdown,
        force_vested,
    };
    storage::save_flags(env, &flags);

    events::emit_shutdown(
        env,
        caller,
        ShutdownChanged {
            shutdown,
            force_vested,
        },
    );
    Ok(flags)
}
