//! Shared test fixtures: a scriptable progress oracle and a wired-up pool.

extern crate std;

use soroban_sdk::{
    contract, contractimpl, contracttype,
    testutils::{Address as _, Ledger},
    token, Address, Env,
};

use crate::{VestingPool, VestingPoolClient};

#[contracttype]
#[derive(Clone)]
enum OracleKey {
    Goal,
    Raised,
    Start,
    End,
    Broken,
    Contribution(Address),
}

/// Progress oracle whose readings are set directly by the test.
#[contract]
pub struct MockOracle;

#[contractimpl]
impl MockOracle {
    pub fn set_progress(env: Env, goal: i128, raised: i128) {
        env.storage().instance().set(&OracleKey::Goal, &goal);
        env.storage().instance().set(&OracleKey::Raised, &raised);
    }

    pub fn set_window(env: Env, start: u64, end: u64) {
        env.storage().instance().set(&OracleKey::Start, &start);
        env.storage().instance().set(&OracleKey::End, &end);
    }

    pub fn set_contribution(env: Env, user: Address, amount: i128) {
        env.storage()
            .instance()
            .set(&OracleKey::Contribution(user), &amount);
    }

    /// Make `get_amount_raised` trap.
    pub fn set_broken(env: Env, broken: bool) {
        env.storage().instance().set(&OracleKey::Broken, &broken);
    }

    pub fn get_goal_value(env: Env) -> i128 {
        env.storage().instance().get(&OracleKey::Goal).unwrap_or(0)
    }

    pub fn get_amount_raised(env: Env) -> i128 {
        let broken: bool = env
            .storage()
            .instance()
            .get(&OracleKey::Broken)
            .unwrap_or(false);
        if broken {
            panic!("oracle offline");
        }
        env.storage().instance().get(&OracleKey::Raised).unwrap_or(0)
    }

    pub fn get_remaining_value(env: Env) -> i128 {
        let goal = Self::get_goal_value(env.clone());
        let raised = Self::get_amount_raised(env);
        (goal - raised).max(0)
    }

    pub fn get_start_time(env: Env) -> u64 {
        env.storage().instance().get(&OracleKey::Start).unwrap_or(0)
    }

    pub fn get_end_time(env: Env) -> u64 {
        env.storage().instance().get(&OracleKey::End).unwrap_or(0)
    }

    pub fn get_user_contributions(env: Env, user: Address) -> i128 {
        env.storage()
            .instance()
            .get(&OracleKey::Contribution(user))
            .unwrap_or(0)
    }
}

/// A pool contract wired to a mock oracle and a Stellar asset as underlying.
pub struct TestPool {
    pub env: Env,
    pub client: VestingPoolClient<'static>,
    pub oracle: MockOracleClient<'static>,
    pub token: token::Client<'static>,
    pub token_admin: token::StellarAssetClient<'static>,
    pub owner: Address,
}

/// Deployed and `init`ed, vesting parameters not yet frozen.
pub fn setup() -> TestPool {
    let env = Env::default();
    env.mock_all_auths();

    let owner = Address::generate(&env);
    let issuer = Address::generate(&env);
    let asset = env.register_stellar_asset_contract_v2(issuer);
    let token = token::Client::new(&env, &asset.address());
    let token_admin = token::StellarAssetClient::new(&env, &asset.address());

    let oracle_id = env.register(MockOracle, ());
    let oracle = MockOracleClient::new(&env, &oracle_id);

    let pool_id = env.register(VestingPool, ());
    let client = VestingPoolClient::new(&env, &pool_id);
    client.init(&owner, &oracle_id, &token.address);

    TestPool {
        env,
        client,
        oracle,
        token,
        token_admin,
        owner,
    }
}

/// Pool with frozen parameters for `goal`, an open-ended raise, and `raised`
/// reported by the oracle.
pub fn setup_configured(goal: i128, raised: i128) -> TestPool {
    let pool = setup();
    pool.oracle.set_progress(&goal, &raised);
    pool.client.initialize_vesting_params(&pool.owner);
    pool
}

impl TestPool {
    /// Mint `amount` of underlying to the owner and deposit it at par value.
    pub fn fund(&self, amount: i128) {
        self.token_admin.mint(&self.owner, &amount);
        self.client
            .deposit_underlying(&self.owner, &amount, &amount);
    }

    pub fn holder_with_shares(&self, shares: i128) -> Address {
        let holder = Address::generate(&self.env);
        self.client.mint(&self.owner, &holder, &shares);
        holder
    }

    /// Update the oracle's raised amount, keeping the current goal.
    pub fn set_raised(&self, raised: i128) {
        let goal = self.oracle.get_goal_value();
        self.oracle.set_progress(&goal, &raised);
    }

    pub fn set_time(&self, timestamp: u64) {
        self.env.ledger().with_mut(|li| li.timestamp = timestamp);
    }

    pub fn underlying_of(&self, who: &Address) -> i128 {
        self.token.balance(who)
    }
}
