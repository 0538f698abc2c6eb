//! MARCO-style dual enumerator: walks a map-solver over the universal
//! feature vector, classifying every model as a CXp witness
//! (`path_to_zero` holds) or an AXp witness, minimizing it with the chosen
//! engines and blocking its cover before asking the map-solver for another
//! model.

use rustsat::instances::BasicVarManager;
use rustsat::solvers::{Solve, SolverResult};
use rustsat::types::{Clause, Var};
use rustsat_glucose::simp::Glucose as GlucoseSimp;

use crate::axp::{AxpEngine, HornAxpEngine, TraverseAxpEngine};
use crate::cxp::CxpEngine;
use crate::error::XpgError;
use crate::xpg::{FeatureId, XpG};

/// Receives explanations as MARCO emits them, so a caller can stream results
/// instead of waiting for the full enumeration to buffer both lists.
pub trait ExplanationSink {
    fn axp(&mut self, axp: Vec<FeatureId>);
    fn cxp(&mut self, cxp: Vec<FeatureId>);
}

/// The default sink: buffers both lists for callers that just want the
/// complete result.
#[derive(Debug, Default)]
pub struct Collected {
    pub axps: Vec<Vec<FeatureId>>,
    pub cxps: Vec<Vec<FeatureId>>,
}

impl ExplanationSink for Collected {
    fn axp(&mut self, axp: Vec<FeatureId>) {
        self.axps.push(axp);
    }

    fn cxp(&mut self, cxp: Vec<FeatureId>) {
        self.cxps.push(cxp);
    }
}

/// Enumerates every AXp and every CXp, returning them as two buffered lists.
pub fn enumerate(
    xpg: &XpG,
    use_horn: bool,
) -> Result<(Vec<Vec<FeatureId>>, Vec<Vec<FeatureId>>), XpgError> {
    let mut sink = Collected::default();
    enumerate_streaming(xpg, use_horn, &mut sink)?;
    Ok((sink.axps, sink.cxps))
}

/// Enumerates every AXp and every CXp, pushing each to `sink` as soon as it
/// is found rather than buffering.
pub fn enumerate_streaming(
    xpg: &XpG,
    use_horn: bool,
    sink: &mut dyn ExplanationSink,
) -> Result<(), XpgError> {
    let n = xpg.n_features() as usize;

    let mut var_manager = BasicVarManager::default();
    let map_vars: Vec<Var> = (0..n).map(|_| var_manager.new_var()).collect();

    let mut solver = GlucoseSimp::default();
    // Register every u_i with the map-solver via a tautological clause, so
    // the very first model is well-defined even though no real clause has
    // been added yet. CDCL solvers default unassigned literals to false,
    // which yields an initial all-fixed mask, classifying as an AXp witness
    // on the first iteration.
    for &v in &map_vars {
        let tautology = Clause::from_iter([v.pos_lit(), v.neg_lit()]);
        solver.add_clause(tautology).map_err(XpgError::backend)?;
    }

    let cxp_engine = CxpEngine::new(xpg);
    let mut axp_engine: Box<dyn AxpEngine + '_> = if use_horn {
        Box::new(HornAxpEngine::new(xpg)?)
    } else {
        Box::new(TraverseAxpEngine::new(xpg))
    };

    loop {
        match solver.solve().map_err(XpgError::backend)? {
            SolverResult::Unsat => break,
            SolverResult::Interrupted => {
                return Err(XpgError::backend("MARCO enumeration was interrupted"));
            }
            SolverResult::Sat => {}
        }

        let model = solver.full_solution().map_err(XpgError::backend)?;
        let univ: Vec<bool> =
            map_vars.iter().map(|&v| model.var_value(v).to_bool_with_def(false)).collect();

        if xpg.path_to_zero(&univ)? {
            let cxp = cxp_engine.find_cxp(Some(&univ))?;
            let block: Clause = cxp.iter().map(|&f| map_vars[f as usize].neg_lit()).collect();
            solver.add_clause(block).map_err(XpgError::backend)?;
            sink.cxp(cxp);
        } else {
            let fix: Vec<bool> = univ.iter().map(|&u| !u).collect();
            let axp = axp_engine.find_axp(Some(&fix))?;
            let block: Clause = axp.iter().map(|&f| map_vars[f as usize].pos_lit()).collect();
            solver.add_clause(block).map_err(XpgError::backend)?;
            sink.axp(axp);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xpg::tests::{fixture_s1, fixture_s2};

    fn as_sorted(mut v: Vec<Vec<FeatureId>>) -> Vec<Vec<FeatureId>> {
        v.sort();
        v
    }

    #[test]
    fn s1_enumerates_the_single_axp_and_cxp() {
        let xpg = fixture_s1();
        let (axps, cxps) = enumerate(&xpg, false).unwrap();
        assert_eq!(axps, vec![vec![0]]);
        assert_eq!(cxps, vec![vec![0]]);
    }

    #[test]
    fn s2_enumerates_one_axp_and_three_cxps() {
        let xpg = fixture_s2();
        let (axps, cxps) = enumerate(&xpg, false).unwrap();
        assert_eq!(axps, vec![vec![0, 1, 2]]);
        assert_eq!(as_sorted(cxps), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn s2_horn_and_traverse_backends_agree() {
        let xpg = fixture_s2();
        let (axps_traverse, cxps_traverse) = enumerate(&xpg, false).unwrap();
        let (axps_horn, cxps_horn) = enumerate(&xpg, true).unwrap();
        assert_eq!(as_sorted(axps_traverse), as_sorted(axps_horn));
        assert_eq!(as_sorted(cxps_traverse), as_sorted(cxps_horn));
    }

    #[test]
    fn axps_and_cxps_form_minimal_hitting_sets() {
        let xpg = fixture_s2();
        let (axps, cxps) = enumerate(&xpg, false).unwrap();
        for axp in &axps {
            for cxp in &cxps {
                assert!(
                    axp.iter().any(|f| cxp.contains(f)),
                    "AXp {axp:?} and CXp {cxp:?} must intersect"
                );
            }
        }
    }
}
