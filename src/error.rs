//! Error taxonomy for the explanation engine.
//!
//! Every fallible operation in this crate returns [`XpgError`]. None of the
//! variants are retried internally; a caller sees exactly the failure that
//! occurred, with enough context (line number, node id, feature id) to locate
//! the offending entity.

use thiserror::Error;

use crate::xpg::{FeatureId, NodeId};

#[derive(Error, Debug)]
pub enum XpgError {
    /// The `.xpg` source violates the line grammar in a way the lexer itself
    /// can detect, before any graph invariant is checked.
    #[error(".xpg format error at line {line}: {msg}")]
    FormatError { line: usize, msg: String },

    /// The graph built from a syntactically valid `.xpg` file violates a
    /// structural invariant (cycle, unreachable node, missing instance edge,
    /// terminal with successors, dangling reference).
    #[error("structural error at node {node}: {msg}")]
    StructuralError { node: NodeId, msg: String },

    /// A deletion-based minimizer produced the empty set. This can only
    /// happen if the instance's prediction does not actually depend on any
    /// feature, which is a bug in the caller's XpG, not a recoverable
    /// condition.
    #[error("minimizer produced an empty explanation over {n} features")]
    EmptyExplanation { n: u32 },

    /// A SAT result contradicted an invariant the encoding is supposed to
    /// guarantee (e.g. a CNF-enumerated candidate failed `check_one_axp`, or
    /// a minimality step unexpectedly reported UNSAT).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The SAT solver itself reported an error, including a caller-triggered
    /// interrupt.
    #[error("SAT backend error: {0}")]
    BackendError(String),
}

impl XpgError {
    pub fn structural(node: NodeId, msg: impl Into<String>) -> Self {
        XpgError::StructuralError { node, msg: msg.into() }
    }

    pub fn format(line: usize, msg: impl Into<String>) -> Self {
        XpgError::FormatError { line, msg: msg.into() }
    }

    pub fn empty_explanation(n: u32) -> Self {
        XpgError::EmptyExplanation { n }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        XpgError::InvariantViolation(msg.into())
    }

    pub fn backend(err: impl std::fmt::Display) -> Self {
        XpgError::BackendError(err.to_string())
    }
}

/// Feature-id context attached to an [`XpgError`] that doesn't otherwise
/// name one; used by the CLI when printing diagnostics for membership
/// queries.
pub fn with_feature_context(err: XpgError, f: FeatureId) -> XpgError {
    match err {
        XpgError::InvariantViolation(msg) => {
            XpgError::InvariantViolation(format!("feature {f}: {msg}"))
        }
        other => other,
    }
}
