//! Horn-clause encoding of an XpG: one reachability literal `b_v` per
//! node, one control literal `u_i` per feature, such that assuming
//! `u_i = univ[i]` keeps the encoding satisfiable iff the instance's
//! prediction stays 1 under `univ`.

use rustsat::instances::{BasicVarManager, SatInstance};
use rustsat::types::Lit;

use crate::error::XpgError;
use crate::varpool::{VarKey, VarPool};
use crate::xpg::{NodeKind, XpG};

/// The Horn formula *H*, plus the pool that assigned its variables and the
/// per-feature control literals used as solver assumptions.
pub struct HornEncoding {
    pub instance: SatInstance<BasicVarManager>,
    pub pool: VarPool,
    /// `universal[i]` is the positive literal for `u_i`.
    pub universal: Vec<Lit>,
}

pub fn build(xpg: &XpG) -> Result<HornEncoding, XpgError> {
    let mut instance: SatInstance<BasicVarManager> = SatInstance::new();
    let mut pool = VarPool::new();

    let universal: Vec<Lit> = (0..xpg.n_features())
        .map(|i| pool.get_or_create(VarKey::Universal(i)).pos_lit())
        .collect();

    for node in 0..xpg.n_nodes() as u32 {
        let b_v = pool.get_or_create(VarKey::Reach(node)).pos_lit();
        match xpg.kind(node) {
            NodeKind::Terminal { target: true } => instance.add_unit(b_v),
            NodeKind::Terminal { target: false } => instance.add_unit(!b_v),
            NodeKind::Internal { var } => {
                let u_i = universal[var as usize];
                for (child, label) in xpg.edges(node) {
                    let b_c = pool.get_or_create(VarKey::Reach(child)).pos_lit();
                    if label {
                        instance.add_lit_impl_lit(b_v, b_c);
                    } else {
                        instance.add_cube_impl_clause(&[b_v, u_i], &[b_c]);
                    }
                }
            }
        }
    }

    let b_root = pool
        .get(VarKey::Reach(xpg.root()))
        .ok_or_else(|| XpgError::structural(xpg.root(), "root never assigned a reachability var"))?
        .pos_lit();
    instance.add_unit(b_root);

    Ok(HornEncoding { instance, pool, universal })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xpg::tests::{fixture_s1, fixture_s2};

    #[test]
    fn s1_encoding_has_one_control_literal() {
        let xpg = fixture_s1();
        let enc = build(&xpg).unwrap();
        assert_eq!(enc.universal.len(), 1);
    }

    #[test]
    fn s2_encoding_has_three_control_literals() {
        let xpg = fixture_s2();
        let enc = build(&xpg).unwrap();
        assert_eq!(enc.universal.len(), 3);
    }
}
