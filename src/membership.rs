//! Feature membership queries: does feature `f` belong to some AXp, and
//! which ones.
//!
//! Two independent algorithms are provided. [`membership_brute`] is an
//! exponential baseline used as ground truth in tests. [`membership_cnf`]
//! folds `n + 1` replicas of the XpG into one CNF so a single incremental
//! SAT search enumerates every AXp containing `f`.

use itertools::Itertools;
use rustsat::instances::{BasicVarManager, SatInstance};
use rustsat::solvers::{Solve, SolverResult};
use rustsat::types::{Clause, Lit, Var};
use rustsat_glucose::simp::Glucose as GlucoseSimp;

use crate::error::XpgError;
use crate::varpool::{VarKey, VarPool};
use crate::xpg::{FeatureId, NodeKind, XpG};

/// Verifies that `s` (sorted feature indices) is an AXp: fixing exactly `s`
/// keeps the prediction at 1, and freeing any single member of `s` flips it.
pub fn check_one_axp(xpg: &XpG, s: &[FeatureId]) -> Result<bool, XpgError> {
    let n = xpg.n_features() as usize;
    let mut fixed = vec![false; n];
    for &f in s {
        fixed[f as usize] = true;
    }
    let univ: Vec<bool> = fixed.iter().map(|&f| !f).collect();

    if xpg.path_to_zero(&univ)? {
        return Ok(false);
    }

    for &f in s {
        let mut freed = univ.clone();
        freed[f as usize] = true;
        if !xpg.path_to_zero(&freed)? {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Exponential baseline: tries every subset of the remaining features, in
/// order of increasing size, and keeps those that form an AXp together
/// with `f`.
pub fn membership_brute(
    xpg: &XpG,
    f: FeatureId,
    guess_one: bool,
) -> Result<Vec<Vec<FeatureId>>, XpgError> {
    let others: Vec<FeatureId> = (0..xpg.n_features()).filter(|&i| i != f).collect();
    let mut found = Vec::new();

    for size in 0..=others.len() {
        for combo in others.iter().copied().combinations(size) {
            let mut candidate = combo;
            candidate.push(f);
            candidate.sort_unstable();

            if check_one_axp(xpg, &candidate)? {
                found.push(candidate);
                if guess_one {
                    return Ok(found);
                }
            }
        }
    }

    Ok(found)
}

/// One replica's reachability encoding: the same construction as the Horn
/// encoder, but with node/edge-liveness variables scoped to this replica,
/// and a per-replica "sufficiency held" witness `ev` instead of
/// unit-asserted terminal literals. `forced_live` names the feature whose
/// non-instance edges are live unconditionally within this replica (`None`
/// for the sufficiency replica, `Some(k - 1)` for minimality replica `k`).
fn build_replica(
    xpg: &XpG,
    instance: &mut SatInstance<BasicVarManager>,
    pool: &mut VarPool,
    universal: &[Lit],
    replica: u32,
    forced_live: Option<FeatureId>,
) -> Lit {
    let n_nodes = xpg.n_nodes() as u32;
    let mut incoming: Vec<Vec<Lit>> = vec![Vec::new(); n_nodes as usize];

    for parent in 0..n_nodes {
        if let NodeKind::Internal { var } = xpg.kind(parent) {
            let b_p = pool.get_or_create(VarKey::ReplicaReach(replica, parent)).pos_lit();
            for (child, label) in xpg.edges(parent) {
                let r = pool.get_or_create(VarKey::Replica(replica, parent, child)).pos_lit();
                if label || forced_live == Some(var) {
                    // Edge is live regardless of u_i: r <-> b_p.
                    instance.add_lit_impl_lit(r, b_p);
                    instance.add_lit_impl_lit(b_p, r);
                } else {
                    // Edge is live only when feature i is universal: r <-> b_p & u_i.
                    let u_i = universal[var as usize];
                    instance.add_lit_impl_lit(r, b_p);
                    instance.add_lit_impl_lit(r, u_i);
                    instance.add_cube_impl_clause(&[b_p, u_i], &[r]);
                }
                incoming[child as usize].push(r);
            }
        }
    }

    let mut zero_terminals = Vec::new();
    for node in 0..n_nodes {
        let n_v = pool.get_or_create(VarKey::ReplicaReach(replica, node)).pos_lit();
        if node == xpg.root() {
            instance.add_unit(n_v);
        } else {
            let inc = &incoming[node as usize];
            for &r in inc {
                instance.add_lit_impl_lit(r, n_v);
            }
            instance.add_lit_impl_clause(n_v, inc);
        }
        if let NodeKind::Terminal { target: false } = xpg.kind(node) {
            zero_terminals.push(n_v);
        }
    }

    // ev <-> AND(not n) over the zero-terminal reach vars.
    let ev = pool.get_or_create(VarKey::Ev(replica)).pos_lit();
    for &n in &zero_terminals {
        instance.add_lit_impl_lit(ev, !n);
    }
    let mut disjunction = zero_terminals;
    disjunction.push(ev);
    instance.add_clause(Clause::from_iter(disjunction));

    ev
}

/// Replicated CNF encoding: a single SAT search over `u_0..u_{n-1}` whose
/// models are exactly the AXps containing `f`.
pub fn membership_cnf(
    xpg: &XpG,
    f: FeatureId,
    guess_one: bool,
) -> Result<Vec<Vec<FeatureId>>, XpgError> {
    let n = xpg.n_features();
    let mut instance: SatInstance<BasicVarManager> = SatInstance::new();
    let mut pool = VarPool::new();

    let universal_vars: Vec<Var> = (0..n).map(|i| pool.get_or_create(VarKey::Universal(i))).collect();
    let universal: Vec<Lit> = universal_vars.iter().map(|v| v.pos_lit()).collect();

    // Replica 0: sufficiency of the mask as a whole.
    let ev0 = build_replica(xpg, &mut instance, &mut pool, &universal, 0, None);
    instance.add_unit(ev0);

    // Replicas 1..=n: minimality witness per feature. Each replica's `ev_k`
    // is biconditional with `u_{k-1}`: [u_{k-1}, !ev_k] and [ev_k, !u_{k-1}],
    // so freeing feature k-1 must reach a 0-terminal in replica k exactly
    // when u_{k-1} is set, witnessing that feature's necessity to the mask.
    for k in 1..=n {
        let ev_k = build_replica(xpg, &mut instance, &mut pool, &universal, k, Some(k - 1));
        let u_km1 = universal[(k - 1) as usize];
        instance.add_clause(Clause::from_iter([u_km1, !ev_k]));
        instance.add_clause(Clause::from_iter([ev_k, !u_km1]));
    }

    // Feature f must be fixed (not universal) in every model.
    instance.add_unit(!universal[f as usize]);

    let (cnf, _var_manager) = instance.into_cnf();
    let mut solver = GlucoseSimp::default();
    solver.add_cnf(cnf).map_err(XpgError::backend)?;

    let mut found = Vec::new();
    loop {
        match solver.solve().map_err(XpgError::backend)? {
            SolverResult::Unsat => break,
            SolverResult::Interrupted => {
                return Err(XpgError::backend("membership CNF enumeration was interrupted"));
            }
            SolverResult::Sat => {}
        }

        let model = solver.full_solution().map_err(XpgError::backend)?;
        let s: Vec<FeatureId> = (0..n)
            .filter(|&i| !model.var_value(universal_vars[i as usize]).to_bool_with_def(false))
            .collect();

        if !check_one_axp(xpg, &s)? {
            return Err(XpgError::invariant(format!(
                "CNF membership candidate {s:?} for feature {f} failed check_one_axp"
            )));
        }

        found.push(s.clone());
        let block = Clause::from_iter(s.iter().map(|&i| universal[i as usize]));
        solver.add_clause(block).map_err(XpgError::backend)?;

        if guess_one {
            break;
        }
    }

    Ok(found)
}
