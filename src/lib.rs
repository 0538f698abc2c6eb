//! Formal explanations for graph-structured Boolean classifiers.
//!
//! An eXplanation Graph ([`xpg::XpG`]) is a rooted DAG whose internal nodes
//! test features and whose terminals predict a class. Given one instance
//! (the `label = 1` edges) known to predict class 1, this crate computes
//! abductive explanations (AXps) and contrastive explanations (CXps),
//! enumerates all of both with the MARCO dual enumerator, and answers
//! feature-membership queries.

pub mod axp;
pub mod config;
pub mod cxp;
pub mod error;
pub mod horn;
pub mod marco;
pub mod membership;
pub mod parser;
pub mod varpool;
pub mod xpg;

use std::path::Path;

pub use error::XpgError;
pub use xpg::{FeatureId, NodeId, XpG};

use axp::{AxpEngine, HornAxpEngine, TraverseAxpEngine};
use cxp::CxpEngine;

/// Loads and validates a `.xpg` file.
pub fn xpg_load(path: &Path) -> Result<XpG, XpgError> {
    parser::load(path)
}

/// Renders an `XpG` back to `.xpg` text.
pub fn xpg_serialize(xpg: &XpG) -> String {
    parser::serialize(xpg)
}

/// Computes one subset-minimal AXp, optionally seeded from a caller mask
/// and backed by either the graph-traversal or Horn-SAT engine.
pub fn find_axp(
    xpg: &XpG,
    fixed: Option<&[bool]>,
    use_horn: bool,
) -> Result<Vec<FeatureId>, XpgError> {
    if use_horn {
        HornAxpEngine::new(xpg)?.find_axp(fixed)
    } else {
        TraverseAxpEngine::new(xpg).find_axp(fixed)
    }
}

/// Computes one subset-minimal CXp, seeded from the decision path unless a
/// caller mask is supplied.
pub fn find_cxp(xpg: &XpG, universal: Option<&[bool]>) -> Result<Vec<FeatureId>, XpgError> {
    CxpEngine::new(xpg).find_cxp(universal)
}

/// Enumerates every AXp and every CXp via the MARCO dual enumerator.
pub fn enumerate(
    xpg: &XpG,
    use_horn: bool,
) -> Result<(Vec<Vec<FeatureId>>, Vec<Vec<FeatureId>>), XpgError> {
    marco::enumerate(xpg, use_horn)
}

pub use membership::{check_one_axp, membership_brute, membership_cnf};
