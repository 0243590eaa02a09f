//! Owner capability checks.
//!
//! Every owner-only entry point calls [`require_owner`] before touching state;
//! the caller must both sign the invocation and match the stored owner.

use soroban_sdk::{Address, Env};

use crate::storage;
use crate::types::PoolSetup;
use crate::Error;

/// Load the bootstrap wiring or fail with `NotInitialized`.
pub fn require_setup(env: &Env) -> Result<PoolSetup, Error> {
    storage::load_setup(env).ok_or(Error::NotInitialized)
}

/// Authenticate `caller` and check that it is the pool owner.
pub fn require_owner(env: &Env, caller: &Address) -> Result<PoolSetup, Error> {
    caller.require_auth();
    let setup = require_setup(env)?;
    if &setup.owner != caller {
        return Err(Error::NotAuthorized);
    }
    Ok(setup)
}
