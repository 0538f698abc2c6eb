//! CLI-default configuration, loadable from an optional TOML file.
//!
//! A small settings struct (`serde` + `toml`, no `config` crate)
//! deserialized wholesale, with the CLI flags taking precedence over
//! whatever a config file sets.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MembershipAlgorithm {
    Brute,
    Cnf,
}

impl Default for MembershipAlgorithm {
    fn default() -> Self {
        MembershipAlgorithm::Cnf
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    /// Use the Horn-SAT back-end for AXp minimization instead of direct
    /// graph traversal, unless overridden by `-H`.
    pub use_horn: bool,
    /// Which feature-membership algorithm `-f` runs when neither is forced
    /// from the command line.
    pub membership_algorithm: MembershipAlgorithm,
    /// Base verbosity before `-v` stacking is applied.
    pub default_verbosity: u8,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        ExplainConfig {
            use_horn: false,
            membership_algorithm: MembershipAlgorithm::default(),
            default_verbosity: 0,
        }
    }
}

impl ExplainConfig {
    /// Loads a config file, falling back to defaults for any field it
    /// omits (`#[serde(default)]` on every field).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_cnf_membership_and_traverse_axp() {
        let cfg = ExplainConfig::default();
        assert!(!cfg.use_horn);
        assert_eq!(cfg.membership_algorithm, MembershipAlgorithm::Cnf);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: ExplainConfig = toml::from_str("use_horn = true\n").unwrap();
        assert!(cfg.use_horn);
        assert_eq!(cfg.membership_algorithm, MembershipAlgorithm::Cnf);
    }
}
