//! Contrastive explanation (CXp) engine: deletion-based minimization over
//! graph traversal, seeded from the instance's decision path.

use crate::error::XpgError;
use crate::xpg::{FeatureId, XpG};

pub struct CxpEngine<'a> {
    xpg: &'a XpG,
}

impl<'a> CxpEngine<'a> {
    pub fn new(xpg: &'a XpG) -> Self {
        CxpEngine { xpg }
    }

    /// Minimizes `seed_universal` (the decision path if `None`) into a
    /// subset-minimal CXp.
    pub fn find_cxp(&self, seed_universal: Option<&[bool]>) -> Result<Vec<FeatureId>, XpgError> {
        let n = self.xpg.n_features() as usize;
        let mut univ = match seed_universal {
            Some(s) => s.to_vec(),
            None => self.xpg.decision_path_seed()?,
        };

        for i in 0..n {
            if !univ[i] {
                continue;
            }
            univ[i] = false;
            if !self.xpg.path_to_zero(&univ)? {
                univ[i] = true;
            }
        }

        let cxp: Vec<FeatureId> = (0..n as u32).filter(|&i| univ[i as usize]).collect();
        if cxp.is_empty() {
            return Err(XpgError::empty_explanation(n as u32));
        }
        Ok(cxp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xpg::tests::{fixture_s1, fixture_s2};

    #[test]
    fn s1_finds_unique_cxp() {
        let xpg = fixture_s1();
        let engine = CxpEngine::new(&xpg);
        assert_eq!(engine.find_cxp(None).unwrap(), vec![0]);
    }

    #[test]
    fn s2_cxp_is_a_single_feature() {
        let xpg = fixture_s2();
        let engine = CxpEngine::new(&xpg);
        let cxp = engine.find_cxp(None).unwrap();
        assert_eq!(cxp.len(), 1);
    }

    #[test]
    fn cxp_soundness_holds() {
        let xpg = fixture_s2();
        let engine = CxpEngine::new(&xpg);
        let cxp = engine.find_cxp(None).unwrap();
        let mut univ = vec![false; xpg.n_features() as usize];
        for &f in &cxp {
            univ[f as usize] = true;
        }
        assert!(xpg.path_to_zero(&univ).unwrap());
    }
}
