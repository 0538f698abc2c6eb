//! A strongly-typed SAT variable interner over `rustsat`'s
//! [`BasicVarManager`].
//!
//! [`VarKey`] is a tagged enum fed into an injective map to
//! [`rustsat::types::Var`], so two encoders (`n_k_v`, `r_k_p_c`, `u_i`,
//! `ev_k` and the rest) can never collide by accident. Raw id allocation is
//! delegated to the manager; this pool only owns the key-to-id mapping.

use std::collections::HashMap;

use rustsat::instances::{BasicVarManager, ManageVars};
use rustsat::types::Var;

use crate::xpg::{FeatureId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKey {
    /// `b_v`: node `v` is reachable from root under the current mask.
    Reach(NodeId),
    /// `u_i`: feature `i` is universal.
    Universal(FeatureId),
    /// `r_{k,p,c}`: the replica-`k` edge from parent `p` to child `c` is
    /// live. `k = 0` is the sufficiency replica.
    Replica(u32, NodeId, NodeId),
    /// `n_{k,v}`: node `v` is reachable from root within replica `k`.
    ReplicaReach(u32, NodeId),
    /// `ev_k`: replica `k`'s "prediction still holds" witness.
    Ev(u32),
}

/// Name-indexed injective mapping from [`VarKey`] to a positive SAT variable
/// id, scoped to the lifetime of the formula that owns it.
#[derive(Debug, Default)]
pub struct VarPool {
    manager: BasicVarManager,
    keys: HashMap<VarKey, Var>,
}

impl VarPool {
    pub fn new() -> Self {
        VarPool { manager: BasicVarManager::default(), keys: HashMap::new() }
    }

    /// Returns the variable for `key`, allocating a fresh one on first use.
    pub fn get_or_create(&mut self, key: VarKey) -> Var {
        *self.keys.entry(key).or_insert_with(|| self.manager.new_var())
    }

    /// Returns the variable for `key` if it has already been allocated.
    pub fn get(&self, key: VarKey) -> Option<Var> {
        self.keys.get(&key).copied()
    }

    pub fn var_manager_mut(&mut self) -> &mut BasicVarManager {
        &mut self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_injective() {
        let mut pool = VarPool::new();
        let a = pool.get_or_create(VarKey::Reach(3));
        let b = pool.get_or_create(VarKey::Universal(3));
        assert_ne!(a, b, "distinct key shapes sharing a numeric field must not collide");
    }

    #[test]
    fn repeated_lookup_is_stable() {
        let mut pool = VarPool::new();
        let a = pool.get_or_create(VarKey::Ev(2));
        let b = pool.get_or_create(VarKey::Ev(2));
        assert_eq!(a, b);
    }
}
