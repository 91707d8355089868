//! Persistent-entry TTL helpers shared across the suite.

use soroban_sdk::{Env, IntoVal, Val};

// TTL: ~60 days at 5s/ledger
pub const TTL_THRESHOLD: u32 = 1_036_800;
pub const TTL_EXTEND_TO: u32 = 2_073_600;

/// Extend the TTL of a persistent entry using the suite-wide ledger budget.
///
/// Call after every write to a persistent key; records the suite never
/// deletes (audit history) must not silently expire from the ledger.
pub fn bump_persistent<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
