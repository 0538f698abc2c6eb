//! Abductive explanation (AXp) engine: deletion-based linear minimization
//! over either direct graph traversal or incremental SAT with the Horn
//! encoding.

use rustsat::solvers::{Solve, SolveIncremental, SolverResult};
use rustsat::types::Lit;
use rustsat_glucose::simp::Glucose as GlucoseSimp;

use crate::error::XpgError;
use crate::horn::{self, HornEncoding};
use crate::xpg::{FeatureId, XpG};

/// Common interface over the two AXp back-ends, so MARCO can drive either
/// one without caring which.
pub trait AxpEngine {
    /// Minimizes `seed_fixed` (all-fixed if `None`) into a subset-minimal
    /// AXp. Deletion order follows feature index.
    fn find_axp(&mut self, seed_fixed: Option<&[bool]>) -> Result<Vec<FeatureId>, XpgError>;
}

fn finish(n: usize, fix: Vec<bool>) -> Result<Vec<FeatureId>, XpgError> {
    let axp: Vec<FeatureId> = (0..n as u32).filter(|&i| fix[i as usize]).collect();
    if axp.is_empty() {
        return Err(XpgError::empty_explanation(n as u32));
    }
    Ok(axp)
}

/// Traverse back-end: each deletion step is one `path_to_zero` call.
pub struct TraverseAxpEngine<'a> {
    xpg: &'a XpG,
}

impl<'a> TraverseAxpEngine<'a> {
    pub fn new(xpg: &'a XpG) -> Self {
        TraverseAxpEngine { xpg }
    }
}

impl AxpEngine for TraverseAxpEngine<'_> {
    fn find_axp(&mut self, seed_fixed: Option<&[bool]>) -> Result<Vec<FeatureId>, XpgError> {
        let n = self.xpg.n_features() as usize;
        let mut fix = seed_fixed.map(<[bool]>::to_vec).unwrap_or_else(|| vec![true; n]);

        for i in 0..n {
            if !fix[i] {
                continue;
            }
            fix[i] = false;
            let univ: Vec<bool> = fix.iter().map(|&f| !f).collect();
            if self.xpg.path_to_zero(&univ)? {
                fix[i] = true;
            }
        }

        finish(n, fix)
    }
}

/// Horn back-end: the encoding is built once and cached for the engine's
/// lifetime; each deletion step flips one assumption literal and re-solves
/// incrementally.
pub struct HornAxpEngine<'a> {
    xpg: &'a XpG,
    universal: Vec<Lit>,
    solver: GlucoseSimp,
}

impl<'a> HornAxpEngine<'a> {
    pub fn new(xpg: &'a XpG) -> Result<Self, XpgError> {
        let HornEncoding { instance, universal, .. } = horn::build(xpg)?;
        let (cnf, _var_manager) = instance.into_cnf();
        let mut solver = GlucoseSimp::default();
        solver.add_cnf(cnf).map_err(XpgError::backend)?;
        Ok(HornAxpEngine { xpg, universal, solver })
    }

    fn assumptions(&self, fix: &[bool]) -> Vec<Lit> {
        fix.iter()
            .enumerate()
            .map(|(i, &fixed)| if fixed { !self.universal[i] } else { self.universal[i] })
            .collect()
    }
}

impl AxpEngine for HornAxpEngine<'_> {
    fn find_axp(&mut self, seed_fixed: Option<&[bool]>) -> Result<Vec<FeatureId>, XpgError> {
        let n = self.xpg.n_features() as usize;
        let mut fix = seed_fixed.map(<[bool]>::to_vec).unwrap_or_else(|| vec![true; n]);

        for i in 0..n {
            if !fix[i] {
                continue;
            }
            fix[i] = false;
            let assumps = self.assumptions(&fix);
            match self.solver.solve_assumps(&assumps).map_err(XpgError::backend)? {
                SolverResult::Unsat => fix[i] = true,
                SolverResult::Sat => {}
                SolverResult::Interrupted => {
                    return Err(XpgError::backend("AXp minimization was interrupted"));
                }
            }
        }

        finish(n, fix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xpg::tests::{fixture_s1, fixture_s2};

    #[test]
    fn s1_traverse_finds_unique_axp() {
        let xpg = fixture_s1();
        let mut engine = TraverseAxpEngine::new(&xpg);
        assert_eq!(engine.find_axp(None).unwrap(), vec![0]);
    }

    #[test]
    fn s2_traverse_requires_all_three_features() {
        let xpg = fixture_s2();
        let mut engine = TraverseAxpEngine::new(&xpg);
        assert_eq!(engine.find_axp(None).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn s2_horn_agrees_with_traverse() {
        let xpg = fixture_s2();
        let mut traverse = TraverseAxpEngine::new(&xpg);
        let mut horn = HornAxpEngine::new(&xpg).unwrap();
        assert_eq!(traverse.find_axp(None).unwrap(), horn.find_axp(None).unwrap());
    }

    #[test]
    fn idempotent_on_its_own_output() {
        let xpg = fixture_s2();
        let mut engine = TraverseAxpEngine::new(&xpg);
        let axp = engine.find_axp(None).unwrap();
        let mut seed = vec![false; xpg.n_features() as usize];
        for &f in &axp {
            seed[f as usize] = true;
        }
        assert_eq!(engine.find_axp(Some(&seed)).unwrap(), axp);
    }
}
